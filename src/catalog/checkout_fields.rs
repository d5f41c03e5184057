/// Validation hint attached to a checkout field; the actual validation
/// runs in the form layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldRule {
    Email,
    Phone,
    Address,
    Zipcode,
}

/// A single checkout form field definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CheckoutField {
    pub name: &'static str,
    pub label: &'static str,
    pub required: bool,
    /// Carried over into recurring (membership) orders.
    pub recurring: bool,
    pub default: &'static str,
    pub rules: &'static [FieldRule],
}

const fn field(name: &'static str, label: &'static str, required: bool) -> CheckoutField {
    CheckoutField {
        name,
        label,
        required,
        recurring: false,
        default: "",
        rules: &[],
    }
}

/// The checkout form, in display order.
pub const FIELDS: &[CheckoutField] = &[
    field("first_name", "Voornaam", true),
    field("last_name", "Achternaam", true),
    CheckoutField {
        rules: &[FieldRule::Email],
        ..field("email", "E-mailadres", true)
    },
    CheckoutField {
        rules: &[FieldRule::Phone],
        ..field("phone", "Telefoonnummer", false)
    },
    field("company", "Bedrijfsnaam", false),
    CheckoutField {
        recurring: true,
        rules: &[FieldRule::Address],
        ..field("address", "Adres", true)
    },
    CheckoutField {
        recurring: true,
        rules: &[FieldRule::Zipcode],
        ..field("zipcode", "Postcode", true)
    },
    CheckoutField {
        recurring: true,
        ..field("city", "Stad", true)
    },
    CheckoutField {
        default: "Nederland",
        ..field("country", "Land", true)
    },
    field("create_account", "Maak een account voor me aan", false),
    field("password1", "Wachtwoord", false),
    field("password2", "Wachtwoord (nogmaals)", false),
    field("different_shipping", "Ander afleveradres?", false),
    field("shipping_first_name", "Voornaam", false),
    field("shipping_last_name", "Achternaam", false),
    CheckoutField {
        rules: &[FieldRule::Address],
        ..field("shipping_address", "Verzendadres", false)
    },
    CheckoutField {
        rules: &[FieldRule::Zipcode],
        ..field("shipping_zipcode", "Verzendadres: postcode", false)
    },
    field("shipping_city", "Verzendadres: stad", false),
    field("shipping_country", "Verzendadres: Land", false),
    field("customer_remarks", "Opmerking", false),
    field("date_of_birth", "Geboortedatum", false),
    field("newsletter_signup", "Nieuwsbrief", false),
];

pub fn all() -> &'static [CheckoutField] {
    FIELDS
}

pub fn names() -> Vec<&'static str> {
    FIELDS.iter().map(|f| f.name).collect()
}

pub fn required() -> Vec<&'static CheckoutField> {
    FIELDS.iter().filter(|f| f.required).collect()
}

pub fn recurring() -> Vec<&'static CheckoutField> {
    FIELDS.iter().filter(|f| f.recurring).collect()
}

/// Fields that make up the alternate shipping address block.
pub fn shipping() -> &'static [&'static str] {
    &[
        "different_shipping",
        "shipping_first_name",
        "shipping_last_name",
        "shipping_address",
        "shipping_zipcode",
        "shipping_city",
        "shipping_country",
    ]
}

/// Fields kept in the request between checkout steps; passwords never are.
pub fn to_keep() -> Vec<&'static CheckoutField> {
    FIELDS
        .iter()
        .filter(|f| f.name != "password1" && f.name != "password2")
        .collect()
}

pub fn defaults() -> Vec<(&'static str, &'static str)> {
    FIELDS.iter().map(|f| (f.name, f.default)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_fields_cover_the_billing_address() {
        let required: Vec<_> = required().iter().map(|f| f.name).collect();
        for name in ["first_name", "last_name", "email", "address", "zipcode", "city", "country"] {
            assert!(required.contains(&name), "{name} should be required");
        }
    }

    #[test]
    fn passwords_are_not_kept_between_steps() {
        let kept: Vec<_> = to_keep().iter().map(|f| f.name).collect();
        assert!(!kept.contains(&"password1"));
        assert!(!kept.contains(&"password2"));
        assert!(kept.contains(&"email"));
    }

    #[test]
    fn recurring_fields_are_the_delivery_address() {
        let recurring: Vec<_> = recurring().iter().map(|f| f.name).collect();
        assert_eq!(recurring, vec!["address", "zipcode", "city"]);
    }

    #[test]
    fn country_defaults_to_nederland() {
        let default = defaults()
            .into_iter()
            .find(|(name, _)| *name == "country")
            .map(|(_, default)| default);
        assert_eq!(default, Some("Nederland"));
    }
}
