use sea_query::Iden;

#[derive(Iden, Clone, Copy)]
pub enum Products {
    Table,
    Id,
    CreatedAt,
    Name,
    Description,
    CategoryId,
    Price,
    Quantity,
    Version,
}
