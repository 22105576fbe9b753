//! Contact details: residential address, optional contact address and
//! mobile phone, submitted together as one tab.

use serde::Deserialize;
use serde_json::{json, Map, Value};
use validator::Validate;

use super::address::{empty_address, AddressForm};
use super::{bind_form, bind_prefixed, prefixed, CleanForm, FormErrors};

pub const RESIDENTIAL_PREFIX: &str = "residential";
pub const CONTACT_PREFIX: &str = "contact";

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CoordinatesMainForm {
    /// The contact address differs from the residential one.
    #[serde(default)]
    pub show_contact: bool,
    #[validate(length(max = 30))]
    pub phone_mobile: Option<String>,
}

impl CleanForm for CoordinatesMainForm {
    fn into_payload(self) -> Value {
        json!({ "phone_mobile": self.phone_mobile })
    }
}

/// The three cooperating forms of the tab.
#[derive(Debug, Clone)]
pub struct CoordinatesForms {
    pub main: CoordinatesMainForm,
    pub residential: AddressForm,
    pub contact: Option<AddressForm>,
}

impl CoordinatesForms {
    /// Bind every form, reporting the errors of all of them at once.
    ///
    /// The contact address is only bound when `show_contact` is set.
    pub fn bind(data: &Value) -> Result<Self, FormErrors> {
        let mut errors = FormErrors::new();
        let main = bind_form::<CoordinatesMainForm>(data)
            .map_err(|e| errors.extend(e))
            .ok();
        let residential = bind_prefixed::<AddressForm>(data, RESIDENTIAL_PREFIX)
            .map_err(|e| errors.extend(e))
            .ok();
        let contact = match &main {
            Some(main) if main.show_contact => bind_prefixed::<AddressForm>(data, CONTACT_PREFIX)
                .map_err(|e| errors.extend(e))
                .ok(),
            _ => None,
        };

        match (main, residential) {
            (Some(main), Some(residential)) if errors.is_empty() => Ok(Self {
                main,
                residential,
                contact,
            }),
            _ => Err(errors),
        }
    }

    /// Initial values from the remote coordinates resource.
    pub fn initial(coordinates: &Value) -> Value {
        let mut values = Map::new();
        let mut show_contact = false;
        for prefix in [RESIDENTIAL_PREFIX, CONTACT_PREFIX] {
            let address = coordinates.get(prefix).cloned().unwrap_or(Value::Null);
            if let Value::Object(fields) = AddressForm::initial(&address) {
                for (field, value) in fields {
                    if prefix == CONTACT_PREFIX && !value.is_null() {
                        show_contact = true;
                    }
                    values.insert(prefixed(prefix, &field), value);
                }
            }
        }
        values.insert("show_contact".into(), Value::Bool(show_contact));
        values.insert(
            "phone_mobile".into(),
            coordinates.get("phone_mobile").cloned().unwrap_or(Value::Null),
        );
        values.insert(
            "email".into(),
            coordinates.get("email").cloned().unwrap_or(Value::Null),
        );
        Value::Object(values)
    }

    pub fn into_payload(self) -> Value {
        let mut payload = self.main.into_payload();
        payload["residential"] = self.residential.into_payload();
        payload["contact"] = self
            .contact
            .map(CleanForm::into_payload)
            .unwrap_or_else(empty_address);
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn residential() -> Value {
        json!({
            "residential-street": "Rue de la Loi",
            "residential-street_number": "16",
            "residential-country": "BE",
            "residential-be_postal_code": "1000",
            "residential-be_city": "Bruxelles",
        })
    }

    #[test]
    fn residential_address_is_always_required() {
        let errors = CoordinatesForms::bind(&json!({ "phone_mobile": "+32" })).unwrap_err();
        assert!(errors.has("residential-country"));
        assert!(errors.has("residential-street_number"));
        assert!(!errors.has("contact-country"));
    }

    #[test]
    fn contact_address_is_checked_only_when_shown() {
        let mut data = residential();
        data["show_contact"] = json!(true);
        data["contact-country"] = json!("FR");
        let errors = CoordinatesForms::bind(&data).unwrap_err();
        assert!(errors.has("contact-postal_code"));
        assert!(errors.has("contact-city"));
        assert!(!errors.has("residential-be_city"));
    }

    #[test]
    fn hidden_contact_is_blanked() {
        let mut data = residential();
        data["contact-street"] = json!("Ignored street");
        let forms = CoordinatesForms::bind(&data).unwrap();
        let payload = forms.into_payload();
        assert_eq!(payload["residential"]["code_postal"], "1000");
        assert_eq!(payload["contact"], empty_address());
    }

    #[test]
    fn initial_ticks_show_contact_when_contact_exists() {
        let initial = CoordinatesForms::initial(&json!({
            "residential": { "rue": "A", "pays": "FR" },
            "contact": { "rue": "B", "pays": "FR" },
            "phone_mobile": "0470",
        }));
        assert_eq!(initial["show_contact"], true);
        assert_eq!(initial["contact-street"], "B");
        assert_eq!(initial["residential-country"], "FR");

        let initial = CoordinatesForms::initial(&json!({ "residential": { "rue": "A" } }));
        assert_eq!(initial["show_contact"], false);
    }
}
