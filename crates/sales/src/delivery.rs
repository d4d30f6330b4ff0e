use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use bloomshop_core::{DomainError, DomainResult, Money};

/// Delivery input as submitted by the client. Required fields are optional
/// here so that missing ones surface as field-level validation errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryFields {
    pub sender_name: Option<String>,
    pub sender_phone: Option<String>,
    pub receiver_name: Option<String>,
    pub receiver_phone: Option<String>,
    pub address: Option<String>,
    pub postcard_text: Option<String>,
    pub received_date: Option<NaiveDate>,
    pub received_time: Option<NaiveTime>,
    #[serde(default)]
    pub money_change_requested: bool,
    pub client_money_value: Option<Money>,
}

/// Validated delivery data stored on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryDetails {
    pub sender_name: Option<String>,
    pub sender_phone: Option<String>,
    pub receiver_name: Option<String>,
    pub receiver_phone: Option<String>,
    pub address: String,
    pub postcard_text: Option<String>,
    pub received_date: NaiveDate,
    pub received_time: NaiveTime,
    pub money_change_requested: bool,
    pub client_money_value: Money,
}

impl DeliveryFields {
    pub fn validate(&self) -> DomainResult<DeliveryDetails> {
        let address = non_blank(&self.address)
            .ok_or_else(|| DomainError::validation("address", "delivery address is required"))?;
        let received_date = self
            .received_date
            .ok_or_else(|| DomainError::validation("received_date", "delivery date is required"))?;
        let received_time = self
            .received_time
            .ok_or_else(|| DomainError::validation("received_time", "delivery time is required"))?;

        let client_money_value = match (self.money_change_requested, self.client_money_value) {
            (true, None) => {
                return Err(DomainError::validation(
                    "client_money_value",
                    "amount the client pays with is required when change is requested",
                ));
            }
            (_, Some(v)) if v.amount().is_sign_negative() && !v.is_zero() => {
                return Err(DomainError::validation(
                    "client_money_value",
                    "amount cannot be negative",
                ));
            }
            (_, v) => v.unwrap_or_default(),
        };

        Ok(DeliveryDetails {
            sender_name: non_blank(&self.sender_name),
            sender_phone: non_blank(&self.sender_phone),
            receiver_name: non_blank(&self.receiver_name),
            receiver_phone: non_blank(&self.receiver_phone),
            address,
            postcard_text: non_blank(&self.postcard_text),
            received_date,
            received_time,
            money_change_requested: self.money_change_requested,
            client_money_value,
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> DeliveryFields {
        DeliveryFields {
            receiver_name: Some("Aida".to_string()),
            address: Some("Chui ave 12".to_string()),
            received_date: NaiveDate::from_ymd_opt(2026, 3, 8),
            received_time: NaiveTime::from_hms_opt(10, 30, 0),
            ..DeliveryFields::default()
        }
    }

    fn field_of(err: DomainError) -> String {
        match err {
            DomainError::Validation { field, .. } => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn valid_fields_pass() {
        let details = complete().validate().unwrap();
        assert_eq!(details.address, "Chui ave 12");
        assert_eq!(details.client_money_value, Money::zero());
        assert_eq!(details.sender_name, None);
    }

    #[test]
    fn missing_required_fields_are_named() {
        let mut f = complete();
        f.address = Some("   ".to_string());
        assert_eq!(field_of(f.validate().unwrap_err()), "address");

        let mut f = complete();
        f.received_date = None;
        assert_eq!(field_of(f.validate().unwrap_err()), "received_date");

        let mut f = complete();
        f.received_time = None;
        assert_eq!(field_of(f.validate().unwrap_err()), "received_time");
    }

    #[test]
    fn change_requires_the_cash_amount() {
        let mut f = complete();
        f.money_change_requested = true;
        assert_eq!(field_of(f.validate().unwrap_err()), "client_money_value");

        f.client_money_value = Some("500".parse().unwrap());
        assert_eq!(
            f.validate().unwrap().client_money_value,
            Money::from_int(500).unwrap()
        );
    }
}
