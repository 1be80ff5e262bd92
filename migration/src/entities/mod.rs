pub mod department;
pub mod stored_file;
pub mod user;

pub use department::Entity as DepartmentEntity;
pub use stored_file::Entity as StoredFileEntity;
pub use user::Entity as UserEntity;
