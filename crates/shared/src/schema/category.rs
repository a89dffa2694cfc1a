use sea_query::Iden;

#[derive(Iden, Clone, Copy)]
pub enum Categories {
    Table,
    Id,
    CreatedAt,
    Name,
    Description,
    Version,
}
