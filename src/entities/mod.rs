pub mod company;
pub mod material;
pub mod order;
pub mod order_item;
pub mod skip_hire_order;
pub mod user;

pub mod prelude {
    pub use super::company::Entity as Company;
    pub use super::material::Entity as Material;
    pub use super::order::Entity as Order;
    pub use super::order_item::Entity as OrderItem;
    pub use super::skip_hire_order::Entity as SkipHireOrder;
    pub use super::user::Entity as User;
}
