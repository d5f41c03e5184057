use chrono::{Datelike, Months, NaiveDate, Weekday};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Recurring box membership. Boxes ship once a month, on the first
/// Thursday. A membership without a `recurring_id` has not been charged
/// through the gateway yet, which marks its first order.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "memberships")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    #[sea_orm(nullable)]
    pub product_id: Option<i64>,
    #[sea_orm(nullable)]
    pub payment_id: Option<i64>,
    /// Gateway subscription reference; set after the first charge.
    #[sea_orm(nullable)]
    pub recurring_id: Option<String>,
    /// Explicitly chosen delivery day; the first Thursday when unset.
    #[sea_orm(nullable)]
    pub delivery_date: Option<Date>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    #[sea_orm(nullable)]
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
    #[sea_orm(
        belongs_to = "super::payment::Entity",
        from = "Column::PaymentId",
        to = "super::payment::Column::Id"
    )]
    Payment,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// First Thursday of the month that `date` falls in.
pub fn first_thursday_of(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_weekday_of_month_opt(date.year(), date.month(), Weekday::Thu, 1)
        .expect("every month has a first Thursday")
}

/// The next delivery day strictly after `today`.
pub fn next_delivery_day(today: NaiveDate) -> NaiveDate {
    let thursday = first_thursday_of(today);
    if today >= thursday {
        first_thursday_of(today + Months::new(1))
    } else {
        thursday
    }
}

/// The most recent delivery day on or before `today`.
pub fn last_delivery_day(today: NaiveDate) -> NaiveDate {
    let thursday = first_thursday_of(today);
    if today < thursday {
        first_thursday_of(today - Months::new(1))
    } else {
        thursday
    }
}

/// The delivery day one month after the next one.
pub fn next_months_delivery_day(today: NaiveDate) -> NaiveDate {
    first_thursday_of(next_delivery_day(today) + Months::new(1))
}

impl Model {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Price to charge, given the membership product's price. The first
    /// order, before a gateway subscription exists, gets 25% off.
    pub fn price(&self, product_price: Decimal) -> Decimal {
        if self.product_id.is_none() {
            return Decimal::ZERO;
        }
        if self.recurring_id.is_none() {
            product_price * dec!(0.75)
        } else {
            product_price
        }
    }

    /// A membership created on or after the last delivery day has not been
    /// part of a shipment round yet.
    pub fn is_recent(&self, today: NaiveDate) -> bool {
        self.created_at.date_naive() >= last_delivery_day(today)
    }

    pub fn customer_reference(&self) -> String {
        format!("customer_{}", self.user_id)
    }

    /// The chosen delivery day, or the next first Thursday when the member
    /// never picked one.
    pub fn delivery_day(&self, today: NaiveDate) -> NaiveDate {
        self.delivery_date.unwrap_or_else(|| next_delivery_day(today))
    }

    /// Four candidate delivery days around the next delivery: two days
    /// before it through one day after.
    pub fn delivery_options(&self, today: NaiveDate) -> Vec<NaiveDate> {
        let next = next_delivery_day(today);
        (0..4)
            .map(|offset| next - chrono::Duration::days(2) + chrono::Duration::days(offset))
            .collect()
    }
}
