/// Courier handling a given shipping method key. Unmapped keys ship with
/// the courier of the same name.
pub fn courier_for(shipping_key: &str) -> &str {
    match shipping_key {
        "evening-delivery-trunkrs" | "evening-delivery" => "trunkrs-evening",
        "belgium-delivery" => "trunkrs-belgium",
        "chilled-delivery" => "chill-bill",
        "evening-delivery-chill-bill" => "chill-bill-evening",
        "day-delivery-chill-bill" => "chill-bill-day",
        other => other,
    }
}

/// Label provider used to print a shipment label for this method.
pub fn label_api_for(shipping_key: &str) -> &'static str {
    match shipping_key {
        "evening-delivery" | "evening-delivery-trunkrs" | "day-delivery" | "belgium-delivery" => {
            "pakketpartner"
        }
        "chilled-delivery" | "evening-delivery-chill-bill" | "day-delivery-chill-bill" => {
            "chillbill"
        }
        _ => "smokehouse",
    }
}
