// Login lookup shared by every role table; never serialised.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CredentialsRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}
