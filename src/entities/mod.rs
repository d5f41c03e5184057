pub mod affiliate;
pub mod cart;
pub mod coupon;
pub mod coupon_campaign;
pub mod coupon_order;
pub mod customer;
pub mod loyalty;
pub mod membership;
pub mod notification;
pub mod order;
pub mod order_row;
pub mod payment;
pub mod product;
pub mod product_variation;
pub mod review;
pub mod user;

pub use affiliate::Entity as Affiliate;
pub use cart::Entity as Cart;
pub use coupon::Entity as Coupon;
pub use coupon_campaign::Entity as CouponCampaign;
pub use coupon_order::Entity as CouponOrder;
pub use customer::Entity as Customer;
pub use loyalty::Entity as Loyalty;
pub use membership::Entity as Membership;
pub use notification::Entity as Notification;
pub use order::Entity as Order;
pub use order_row::Entity as OrderRow;
pub use payment::Entity as Payment;
pub use product::Entity as Product;
pub use product_variation::Entity as ProductVariation;
pub use review::Entity as Review;
pub use user::Entity as User;

pub use cart::Model as CartModel;
pub use coupon::Model as CouponModel;
pub use customer::Model as CustomerModel;
pub use membership::Model as MembershipModel;
pub use notification::Model as NotificationModel;
pub use order::Model as OrderModel;
pub use order_row::Model as OrderRowModel;
pub use payment::Model as PaymentModel;
pub use product::Model as ProductModel;
pub use product_variation::Model as ProductVariationModel;
