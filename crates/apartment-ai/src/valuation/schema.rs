use serde::Serialize;

/// Whether a feature is passed through as a number or one-hot encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    Numeric,
    Categorical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeatureSpec {
    pub name: &'static str,
    pub kind: FeatureKind,
}

impl FeatureSpec {
    const fn numeric(name: &'static str) -> Self {
        Self {
            name,
            kind: FeatureKind::Numeric,
        }
    }

    const fn categorical(name: &'static str) -> Self {
        Self {
            name,
            kind: FeatureKind::Categorical,
        }
    }
}

/// Model domains served by the valuation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationDomain {
    SalePrice,
    Rent,
}

impl ValuationDomain {
    pub fn label(&self) -> &'static str {
        match self {
            ValuationDomain::SalePrice => "sale price",
            ValuationDomain::Rent => "rent",
        }
    }

    /// Prefix shared by the artifact files of this domain.
    pub fn artifact_stem(&self) -> &'static str {
        match self {
            ValuationDomain::SalePrice => "house_price",
            ValuationDomain::Rent => "rent",
        }
    }
}

const SALE_PRICE_FEATURES: &[FeatureSpec] = &[
    FeatureSpec::categorical("district"),
    FeatureSpec::categorical("neighborhood"),
    FeatureSpec::categorical("condition"),
    FeatureSpec::categorical("type"),
    FeatureSpec::numeric("rooms"),
    FeatureSpec::numeric("area_m2"),
    FeatureSpec::categorical("lift"),
    FeatureSpec::categorical("views"),
    FeatureSpec::categorical("floor"),
];

const RENT_FEATURES: &[FeatureSpec] = &[
    FeatureSpec::categorical("room_type"),
    FeatureSpec::categorical("district"),
    FeatureSpec::numeric("accommodates"),
    FeatureSpec::numeric("bedrooms"),
];

/// Ordered feature list a pre-fit model was trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSchema {
    domain: ValuationDomain,
    features: &'static [FeatureSpec],
}

impl FeatureSchema {
    pub fn sale_price() -> Self {
        Self {
            domain: ValuationDomain::SalePrice,
            features: SALE_PRICE_FEATURES,
        }
    }

    pub fn rent() -> Self {
        Self {
            domain: ValuationDomain::Rent,
            features: RENT_FEATURES,
        }
    }

    pub fn for_domain(domain: ValuationDomain) -> Self {
        match domain {
            ValuationDomain::SalePrice => Self::sale_price(),
            ValuationDomain::Rent => Self::rent(),
        }
    }

    pub fn domain(&self) -> ValuationDomain {
        self.domain
    }

    pub fn features(&self) -> &'static [FeatureSpec] {
        self.features
    }

    pub fn feature_names(&self) -> Vec<&'static str> {
        self.features.iter().map(|spec| spec.name).collect()
    }

    pub fn categorical_features(&self) -> Vec<&'static str> {
        self.names_of_kind(FeatureKind::Categorical)
    }

    pub fn numeric_features(&self) -> Vec<&'static str> {
        self.names_of_kind(FeatureKind::Numeric)
    }

    pub fn kind_of(&self, name: &str) -> Option<FeatureKind> {
        self.features
            .iter()
            .find(|spec| spec.name == name)
            .map(|spec| spec.kind)
    }

    fn names_of_kind(&self, kind: FeatureKind) -> Vec<&'static str> {
        self.features
            .iter()
            .filter(|spec| spec.kind == kind)
            .map(|spec| spec.name)
            .collect()
    }
}
