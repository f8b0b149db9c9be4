use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

/// Apartment attributes quoted in the sales pitch prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchRequest {
    pub neighborhood: String,
    pub condition: String,
    pub apartment_type: String,
    pub area_m2: u32,
    pub lift: String,
    pub views: String,
    pub floor: String,
    pub room_type: String,
    pub accommodates: u32,
    pub district: String,
    pub rooms: u32,
    pub price: i64,
}

impl PitchRequest {
    /// Deterministic completion prompt; identical attributes always yield identical text.
    pub fn prompt(&self) -> String {
        let mut prompt = String::from(
            "My customer asked me to write a descriptive sales pitch for his house containing the following attributes: \n",
        );
        let attributes: [(&str, String); 12] = [
            ("Neighbourhood", self.neighborhood.clone()),
            ("Condition", self.condition.clone()),
            ("Apartment type", self.apartment_type.clone()),
            ("Area", format!("{}m2", self.area_m2)),
            ("Lift", self.lift.clone()),
            ("Views", self.views.clone()),
            ("Floor", self.floor.clone()),
            ("Room type", self.room_type.clone()),
            ("Bedrooms", self.accommodates.to_string()),
            ("District", self.district.clone()),
            ("Rooms", self.rooms.to_string()),
            ("Price", self.price.to_string()),
        ];
        for (label, value) in attributes {
            writeln!(prompt, "* {label}: {value}").expect("write prompt attribute");
        }
        prompt.push_str(
            "I wrote the following sales pitch that includes the information about the house:\n",
        );
        prompt
    }
}
