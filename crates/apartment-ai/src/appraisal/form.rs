use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::domain::ApartmentListing;
use crate::valuation::ModelStore;

/// Every field the form submits, in display order.
pub const FORM_FIELDS: [&str; 14] = [
    "price",
    "district",
    "neighborhood",
    "condition",
    "type",
    "room_type",
    "rooms",
    "area_m2",
    "accommodates",
    "lift",
    "views",
    "floor",
    "interest_rate",
    "loan_size",
];

/// Closed value sets offered by the form's select fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormChoices {
    pub district: Vec<String>,
    pub neighborhood: Vec<String>,
    pub condition: Vec<String>,
    #[serde(rename = "type")]
    pub apartment_type: Vec<String>,
    pub room_type: Vec<String>,
    pub lift: Vec<String>,
    pub views: Vec<String>,
    pub floor: Vec<String>,
}

impl FormChoices {
    /// Choices come from the training-time vocabularies; a district must be known to both models.
    pub fn from_store(store: &ModelStore) -> Self {
        let rent_districts = store.rent.choices("district");
        let district = store
            .price
            .choices("district")
            .into_iter()
            .filter(|district| rent_districts.contains(district))
            .collect();

        Self {
            district,
            neighborhood: store.price.choices("neighborhood"),
            condition: store.price.choices("condition"),
            apartment_type: store.price.choices("type"),
            room_type: store.rent.choices("room_type"),
            lift: store.price.choices("lift"),
            views: store.price.choices("views"),
            floor: store.price.choices("floor"),
        }
    }

    pub fn options(&self, field: &str) -> Option<&[String]> {
        let options = match field {
            "district" => &self.district,
            "neighborhood" => &self.neighborhood,
            "condition" => &self.condition,
            "type" => &self.apartment_type,
            "room_type" => &self.room_type,
            "lift" => &self.lift,
            "views" => &self.views,
            "floor" => &self.floor,
            _ => return None,
        };
        Some(options.as_slice())
    }

    /// Field-level errors for any select value outside its vocabulary or any
    /// negative amount.
    pub fn check(&self, listing: &ApartmentListing) -> FormErrors {
        let mut errors = FormErrors::default();
        if listing.price < 0 {
            errors.insert("price", NEGATIVE_AMOUNT);
        }
        if listing.loan_size < 0 {
            errors.insert("loan_size", NEGATIVE_AMOUNT);
        }
        if !(listing.interest_rate.is_finite() && listing.interest_rate >= 0.0) {
            errors.insert("interest_rate", INVALID_RATE);
        }
        for (field, value) in [
            ("district", &listing.district),
            ("neighborhood", &listing.neighborhood),
            ("condition", &listing.condition),
            ("type", &listing.apartment_type),
            ("room_type", &listing.room_type),
            ("lift", &listing.lift),
            ("views", &listing.views),
            ("floor", &listing.floor),
        ] {
            if !self.is_valid(field, value) {
                errors.insert(field, invalid_choice(value));
            }
        }
        errors
    }

    fn is_valid(&self, field: &str, value: &str) -> bool {
        self.options(field)
            .is_some_and(|options| options.iter().any(|option| option == value))
    }
}

const NEGATIVE_AMOUNT: &str = "Ensure this value is greater than or equal to 0.";
const INVALID_RATE: &str = "Enter a non-negative number, e.g. 0.03.";

fn invalid_choice(value: &str) -> String {
    format!("Select a valid choice. {value} is not one of the available choices.")
}

/// Validation messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<&'static str, String>);

impl FormErrors {
    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }
}

/// Raw query string values; every field is optional until validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApartmentQuery {
    pub price: Option<String>,
    pub district: Option<String>,
    pub neighborhood: Option<String>,
    pub condition: Option<String>,
    #[serde(rename = "type")]
    pub apartment_type: Option<String>,
    pub room_type: Option<String>,
    pub rooms: Option<String>,
    pub area_m2: Option<String>,
    pub accommodates: Option<String>,
    pub lift: Option<String>,
    pub views: Option<String>,
    pub floor: Option<String>,
    pub interest_rate: Option<String>,
    pub loan_size: Option<String>,
}

impl ApartmentQuery {
    /// A request without any form field is a plain page visit, not a submission.
    pub fn is_submission(&self) -> bool {
        FORM_FIELDS.iter().any(|field| self.value(field).is_some())
    }

    pub fn value(&self, field: &str) -> Option<&str> {
        let value = match field {
            "price" => &self.price,
            "district" => &self.district,
            "neighborhood" => &self.neighborhood,
            "condition" => &self.condition,
            "type" => &self.apartment_type,
            "room_type" => &self.room_type,
            "rooms" => &self.rooms,
            "area_m2" => &self.area_m2,
            "accommodates" => &self.accommodates,
            "lift" => &self.lift,
            "views" => &self.views,
            "floor" => &self.floor,
            "interest_rate" => &self.interest_rate,
            "loan_size" => &self.loan_size,
            _ => return None,
        };
        value.as_deref()
    }

    /// Validate every field, collecting all errors before giving up.
    pub fn validate(&self, choices: &FormChoices) -> Result<ApartmentListing, FormErrors> {
        let mut form = FieldReader {
            query: self,
            choices,
            errors: FormErrors::default(),
        };

        let price = form.non_negative::<i64>("price");
        let district = form.choice("district");
        let neighborhood = form.choice("neighborhood");
        let condition = form.choice("condition");
        let apartment_type = form.choice("type");
        let room_type = form.choice("room_type");
        let rooms = form.number::<u32>("rooms");
        let area_m2 = form.number::<u32>("area_m2");
        let accommodates = form.number::<u32>("accommodates");
        let lift = form.choice("lift");
        let views = form.choice("views");
        let floor = form.choice("floor");
        let interest_rate = form.rate("interest_rate");
        let loan_size = form.non_negative::<i64>("loan_size");

        let assemble = || -> Option<ApartmentListing> {
            Some(ApartmentListing {
                price: price?,
                district: district?,
                neighborhood: neighborhood?,
                condition: condition?,
                apartment_type: apartment_type?,
                room_type: room_type?,
                rooms: rooms?,
                area_m2: area_m2?,
                accommodates: accommodates?,
                lift: lift?,
                views: views?,
                floor: floor?,
                interest_rate: interest_rate?,
                loan_size: loan_size?,
            })
        };

        match assemble() {
            Some(listing) if form.errors.is_empty() => Ok(listing),
            _ => Err(form.errors),
        }
    }
}

struct FieldReader<'a> {
    query: &'a ApartmentQuery,
    choices: &'a FormChoices,
    errors: FormErrors,
}

impl FieldReader<'_> {
    fn required(&mut self, field: &'static str) -> Option<&str> {
        match self.query.value(field).map(str::trim) {
            Some(value) if !value.is_empty() => Some(value),
            _ => {
                self.errors.insert(field, "This field is required.");
                None
            }
        }
    }

    fn number<T: FromStr>(&mut self, field: &'static str) -> Option<T> {
        let raw = self.required(field)?.to_string();
        match raw.parse::<T>() {
            Ok(value) => Some(value),
            Err(_) => {
                self.errors.insert(field, "Enter a whole number.");
                None
            }
        }
    }

    fn non_negative<T: FromStr + PartialOrd + Default>(&mut self, field: &'static str) -> Option<T> {
        let value = self.number::<T>(field)?;
        if value < T::default() {
            self.errors.insert(field, NEGATIVE_AMOUNT);
            return None;
        }
        Some(value)
    }

    fn rate(&mut self, field: &'static str) -> Option<f64> {
        let raw = self.required(field)?.to_string();
        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() && value >= 0.0 => Some(value),
            _ => {
                self.errors.insert(field, INVALID_RATE);
                None
            }
        }
    }

    fn choice(&mut self, field: &'static str) -> Option<String> {
        let value = self.required(field)?.to_string();
        if self.choices.is_valid(field, &value) {
            Some(value)
        } else {
            self.errors.insert(field, invalid_choice(&value));
            None
        }
    }
}
