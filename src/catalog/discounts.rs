/// How a discount type reduces the price.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Percentage {
    /// The markdown lives on the product itself (`price` vs
    /// `original_price`); nothing extra to calculate.
    Product,
    /// Percentage off the original price, per threshold-multiple.
    Off(u32),
}

/// A per-row promotional rule, distinct from cart-level coupons.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiscountType {
    pub name: &'static str,
    pub slug: &'static str,
    /// Minimum quantity before the rule applies.
    pub quantity: i32,
    pub percentage: Percentage,
}

/// All discount types the store runs. The table is fixed; new promotions
/// are a code change, not configuration.
pub const TYPES: &[DiscountType] = &[
    DiscountType {
        name: "Aanbieding",
        slug: "sale",
        quantity: 1,
        percentage: Percentage::Product,
    },
    DiscountType {
        name: "2e halve prijs",
        slug: "second-half-price",
        quantity: 2,
        percentage: Percentage::Off(50),
    },
];

impl DiscountType {
    pub fn find(slug: &str) -> Option<&'static DiscountType> {
        TYPES.iter().find(|t| t.slug == slug)
    }

    pub fn percentage_off(&self) -> Option<u32> {
        match self.percentage {
            Percentage::Product => None,
            Percentage::Off(p) => Some(p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_known_types() {
        let second = DiscountType::find("second-half-price").expect("known type");
        assert_eq!(second.quantity, 2);
        assert_eq!(second.percentage_off(), Some(50));
    }

    #[test]
    fn sale_has_no_stackable_percentage() {
        let sale = DiscountType::find("sale").expect("known type");
        assert_eq!(sale.percentage_off(), None);
    }

    #[test]
    fn unknown_slug_is_none() {
        assert!(DiscountType::find("three-for-two").is_none());
    }
}
