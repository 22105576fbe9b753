//! Postal address sub-form.
//!
//! Belgian addresses use dedicated postal code and city fields (backed by
//! the official city list on the client side); every other country uses
//! the free-text pair. The wire payload only knows `code_postal`/`ville`.

use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use super::{CleanForm, FormErrors};

pub const BE_ISO_CODE: &str = "BE";

pub const STREET_OR_BOX_MESSAGE: &str = "Please set either the street or the postal box.";

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct AddressForm {
    #[validate(length(max = 255))]
    pub street: Option<String>,
    #[validate(length(max = 20))]
    pub street_number: Option<String>,
    #[validate(length(max = 20))]
    pub postal_box: Option<String>,
    pub location: Option<String>,
    #[validate(length(max = 20))]
    pub postal_code: Option<String>,
    pub city: Option<String>,
    /// ISO 3166 alpha-2 code.
    pub country: Option<String>,
    pub be_postal_code: Option<String>,
    pub be_city: Option<String>,
}

impl AddressForm {
    pub fn is_belgian(&self) -> bool {
        self.country.as_deref() == Some(BE_ISO_CODE)
    }

    /// Initial values from a wire address, filling the Belgian pair when
    /// the address is in Belgium.
    pub fn initial(address: &Value) -> Value {
        let field = |key: &str| address.get(key).cloned().unwrap_or(Value::Null);
        let is_belgian = address.get("pays").and_then(Value::as_str) == Some(BE_ISO_CODE);
        json!({
            "street": field("rue"),
            "street_number": field("numero_rue"),
            "postal_box": field("boite_postale"),
            "location": field("lieu_dit"),
            "postal_code": field("code_postal"),
            "city": field("ville"),
            "country": field("pays"),
            "be_postal_code": if is_belgian { field("code_postal") } else { Value::Null },
            "be_city": if is_belgian { field("ville") } else { Value::Null },
        })
    }
}

impl CleanForm for AddressForm {
    fn clean(&mut self, errors: &mut FormErrors) {
        if self.street_number.is_none() {
            errors.required("street_number");
        }
        if self.country.is_none() {
            errors.required("country");
        }
        if self.is_belgian() {
            if self.be_postal_code.is_none() {
                errors.required("be_postal_code");
            }
            if self.be_city.is_none() {
                errors.required("be_city");
            }
        } else {
            if self.postal_code.is_none() {
                errors.required("postal_code");
            }
            if self.city.is_none() {
                errors.required("city");
            }
        }
        if self.street.is_none() && self.postal_box.is_none() {
            errors.add("street", STREET_OR_BOX_MESSAGE);
            errors.add("postal_box", STREET_OR_BOX_MESSAGE);
        }
    }

    fn into_payload(self) -> Value {
        let (postal_code, city) = if self.is_belgian() {
            (self.be_postal_code, self.be_city)
        } else {
            (self.postal_code, self.city)
        };
        json!({
            "rue": self.street,
            "numero_rue": self.street_number,
            "boite_postale": self.postal_box,
            "lieu_dit": self.location,
            "code_postal": postal_code,
            "ville": city,
            "pays": self.country,
        })
    }
}

/// Wire shape of an address that was not provided.
pub fn empty_address() -> Value {
    json!({
        "rue": null,
        "numero_rue": null,
        "boite_postale": null,
        "lieu_dit": null,
        "code_postal": null,
        "ville": null,
        "pays": null,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::{bind_form, REQUIRED_MESSAGE};

    #[test]
    fn belgian_address_requires_belgian_postal_fields() {
        let errors = bind_form::<AddressForm>(&json!({
            "street": "Rue de la Loi",
            "street_number": "16",
            "country": "BE",
            "postal_code": "1000",
            "city": "Bruxelles",
        }))
        .unwrap_err();

        assert_eq!(errors.field("be_postal_code"), [REQUIRED_MESSAGE.to_string()]);
        assert!(errors.has("be_city"));
        assert!(!errors.has("postal_code"));
        assert!(!errors.has("city"));
    }

    #[test]
    fn foreign_address_requires_free_postal_fields() {
        let errors = bind_form::<AddressForm>(&json!({
            "street": "Champs-Elysees",
            "street_number": "1",
            "country": "FR",
            "be_postal_code": "1000",
            "be_city": "Bruxelles",
        }))
        .unwrap_err();

        assert!(errors.has("postal_code"));
        assert!(errors.has("city"));
        assert!(!errors.has("be_postal_code"));
    }

    #[test]
    fn belgian_fields_collapse_on_transform() {
        let form = bind_form::<AddressForm>(&json!({
            "street": "Place de l'Universite",
            "street_number": "1",
            "country": "BE",
            "be_postal_code": "1348",
            "be_city": "Louvain-la-Neuve",
            "postal_code": "stale",
        }))
        .unwrap();

        let payload = form.into_payload();
        assert_eq!(payload["code_postal"], "1348");
        assert_eq!(payload["ville"], "Louvain-la-Neuve");
        assert!(payload.get("be_postal_code").is_none());
    }

    #[test]
    fn street_or_box_is_needed() {
        let errors = bind_form::<AddressForm>(&json!({
            "street_number": "1",
            "country": "FR",
            "postal_code": "75000",
            "city": "Paris",
        }))
        .unwrap_err();
        assert_eq!(errors.field("street"), [STREET_OR_BOX_MESSAGE.to_string()]);
        assert_eq!(errors.field("postal_box"), [STREET_OR_BOX_MESSAGE.to_string()]);
    }

    #[test]
    fn initial_fills_belgian_pair() {
        let initial = AddressForm::initial(&json!({
            "rue": "Rue", "numero_rue": "2", "code_postal": "1348",
            "ville": "Louvain-la-Neuve", "pays": "BE",
        }));
        assert_eq!(initial["be_postal_code"], "1348");
        assert_eq!(initial["be_city"], "Louvain-la-Neuve");
    }
}
