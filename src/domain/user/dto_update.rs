#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateUserDto {
    pub username: String,
    pub email: String,
}
