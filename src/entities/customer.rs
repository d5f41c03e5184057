use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Checkout customer record: billing address plus an optional separate
/// shipping address, linked to a user account when one exists.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(nullable)]
    pub user_id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[sea_orm(nullable)]
    pub phone: Option<String>,
    #[sea_orm(nullable)]
    pub company: Option<String>,
    pub address: String,
    pub zipcode: String,
    pub city: String,
    pub country: String,
    pub shipping_first_name: String,
    pub shipping_last_name: String,
    pub shipping_address: String,
    pub shipping_zipcode: String,
    pub shipping_city: String,
    pub shipping_country: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::order::Entity")]
    Order,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// The shipping address after falling back to billing fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedShippingAddress {
    pub address: String,
    pub zipcode: String,
    pub city: String,
    pub country: String,
    pub country_code: Option<&'static str>,
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

impl Model {
    pub fn name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Name on the shipping label; billing name when no separate shipping
    /// name was entered.
    pub fn shipping_name(&self) -> String {
        if !blank(&self.shipping_first_name) && !blank(&self.shipping_last_name) {
            format!("{} {}", self.shipping_first_name, self.shipping_last_name)
        } else {
            self.name()
        }
    }

    /// Shipping address with per-field fallback to the billing address.
    /// The country additionally falls back to the billing country whenever
    /// no shipping street address was entered at all.
    pub fn shipping_info(&self) -> ResolvedShippingAddress {
        let pick = |shipping: &str, billing: &str| {
            if blank(shipping) {
                billing.to_string()
            } else {
                shipping.to_string()
            }
        };

        let country = if blank(&self.shipping_address) {
            self.country.clone()
        } else {
            pick(&self.shipping_country, &self.country)
        };

        ResolvedShippingAddress {
            address: pick(&self.shipping_address, &self.address),
            zipcode: pick(&self.shipping_zipcode, &self.zipcode),
            city: pick(&self.shipping_city, &self.city),
            country_code: country_code(&country),
            country,
        }
    }

    pub fn country_code(&self) -> Option<&'static str> {
        country_code(&self.country)
    }

    /// Phone number in international notation. Rewrites 0031/0032 prefixes
    /// and prepends the country prefix to national numbers.
    pub fn international_phone(&self) -> Option<String> {
        let phone = self.phone.as_deref()?;
        let code = country_code(&self.country)?;
        let prefix = match code {
            "NL" => "+31",
            "BE" => "+32",
            _ => return Some(phone.to_string()),
        };
        let alt = match code {
            "NL" => "0031",
            "BE" => "0032",
            _ => unreachable!(),
        };

        if phone.starts_with(prefix) {
            return Some(phone.to_string());
        }
        if phone.starts_with(alt) {
            return Some(phone.replacen(alt, prefix, 1));
        }

        let national = phone.strip_prefix('0').unwrap_or(phone);
        Some(format!("{}{}", prefix, national.replace(' ', "")))
    }
}

/// Normalizes the free-text country field to an ISO code.
pub fn country_code(country: &str) -> Option<&'static str> {
    match country.to_lowercase().as_str() {
        "nederland" | "netherlands" | "the netherlands" | "nl" => Some("NL"),
        "belgium" | "belgie" | "belgië" | "be" => Some("BE"),
        "duitsland" | "germany" | "deutschland" | "de" => Some("DE"),
        "luxemburg" | "luxembourg" | "lu" => Some("LU"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn customer() -> Model {
        Model {
            id: 1,
            user_id: None,
            first_name: "Jan".into(),
            last_name: "de Vries".into(),
            email: "jan@example.com".into(),
            phone: Some("06 12345678".into()),
            company: None,
            address: "Hoofdstraat 1".into(),
            zipcode: "1234 AB".into(),
            city: "Utrecht".into(),
            country: "Nederland".into(),
            shipping_first_name: String::new(),
            shipping_last_name: String::new(),
            shipping_address: String::new(),
            shipping_zipcode: String::new(),
            shipping_city: String::new(),
            shipping_country: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn shipping_falls_back_to_billing() {
        let info = customer().shipping_info();
        assert_eq!(info.address, "Hoofdstraat 1");
        assert_eq!(info.city, "Utrecht");
        assert_eq!(info.country, "Nederland");
        assert_eq!(info.country_code, Some("NL"));
    }

    #[test]
    fn partial_shipping_address_mixes_fields() {
        let mut customer = customer();
        customer.shipping_address = "Kadeplein 9".into();
        customer.shipping_zipcode = "2000".into();
        customer.shipping_city = "Antwerpen".into();
        customer.shipping_country = "België".into();
        let info = customer.shipping_info();
        assert_eq!(info.address, "Kadeplein 9");
        assert_eq!(info.country_code, Some("BE"));
    }

    #[test]
    fn shipping_name_falls_back_to_billing_name() {
        let mut customer = customer();
        assert_eq!(customer.shipping_name(), "Jan de Vries");
        customer.shipping_first_name = "Piet".into();
        customer.shipping_last_name = "Jansen".into();
        assert_eq!(customer.shipping_name(), "Piet Jansen");
    }

    #[rstest::rstest]
    #[case("Nederland", Some("NL"))]
    #[case("The Netherlands", Some("NL"))]
    #[case("belgië", Some("BE"))]
    #[case("Belgium", Some("BE"))]
    #[case("Deutschland", Some("DE"))]
    #[case("Luxembourg", Some("LU"))]
    #[case("france", None)]
    fn country_codes_normalize_spellings(
        #[case] country: &str,
        #[case] expected: Option<&'static str>,
    ) {
        assert_eq!(country_code(country), expected);
    }

    #[test]
    fn national_phone_gets_country_prefix() {
        let customer = customer();
        assert_eq!(
            customer.international_phone().as_deref(),
            Some("+31612345678")
        );
    }

    #[test]
    fn zero_zero_prefix_is_rewritten() {
        let mut customer = customer();
        customer.phone = Some("0031612345678".into());
        assert_eq!(
            customer.international_phone().as_deref(),
            Some("+31612345678")
        );
    }

    #[test]
    fn already_international_numbers_pass_through() {
        let mut customer = customer();
        customer.phone = Some("+31612345678".into());
        assert_eq!(
            customer.international_phone().as_deref(),
            Some("+31612345678")
        );
    }
}
