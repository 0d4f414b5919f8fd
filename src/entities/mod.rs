pub mod category;
pub mod coupon;
pub mod notification;
pub mod order;
pub mod order_item;
pub mod product;
pub mod review;
pub mod wishlist;

pub use category::Entity as Category;
pub use coupon::Entity as Coupon;
pub use notification::Entity as Notification;
pub use order::Entity as Order;
pub use order_item::Entity as OrderItem;
pub use product::Entity as Product;
pub use review::Entity as Review;
pub use wishlist::Entity as Wishlist;

pub use category::Model as CategoryModel;
pub use coupon::Model as CouponModel;
pub use notification::Model as NotificationModel;
pub use order::Model as OrderModel;
pub use order_item::Model as OrderItemModel;
pub use product::Model as ProductModel;
pub use review::Model as ReviewModel;
pub use wishlist::Model as WishlistModel;
