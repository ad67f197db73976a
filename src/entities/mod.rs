pub mod category;
pub mod contact;
pub mod gallery;
pub mod image;
pub mod setting;
pub mod users;

pub mod prelude {
    pub use super::category::Entity as Category;
    pub use super::contact::Entity as Contact;
    pub use super::gallery::Entity as Gallery;
    pub use super::image::Entity as Image;
    pub use super::setting::Entity as Setting;
    pub use super::users::Entity as Users;
}

// Category entities
pub use category::{
    ActiveModel as CategoryActiveModel, Column as CategoryColumn, Entity as CategoryEntity,
    Model as CategoryModel,
};

// Gallery entities
pub use gallery::{
    ActiveModel as GalleryActiveModel, Column as GalleryColumn, Entity as GalleryEntity,
    Model as GalleryModel,
};

// Image entities
pub use image::{
    ActiveModel as ImageActiveModel, Column as ImageColumn, Entity as ImageEntity,
    Model as ImageModel,
};

// Contact entities
pub use contact::{
    ActiveModel as ContactActiveModel, Column as ContactColumn, ContactStatus,
    Entity as ContactEntity, Model as ContactModel,
};

// Setting entities
pub use setting::{
    ActiveModel as SettingActiveModel, Column as SettingColumn, Entity as SettingEntity,
    Model as SettingModel,
};

// User entities
pub use users::{
    ActiveModel as UserActiveModel, Column as UserColumn, Entity as UserEntity,
    Model as UserModel, RoleEnum,
};
