//! Flat market records and the categorical dimensions they carry.

use crate::catalog::CategoryPath;
use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declares a closed set of categories whose literal labels are part of the
/// presentation contract.
macro_rules! labeled_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($kind:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $label)] $variant ),+
        }

        impl $name {
            /// Every variant in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Literal label consumers match on.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| ParseError::UnknownLabel {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }
    };
}

labeled_enum! {
    /// Geographic sales region.
    Region ("region") {
        NorthAmerica => "North America",
        Europe => "Europe",
        AsiaPacific => "Asia Pacific",
        /// Aggregated remainder without a per-country split.
        RestOfWorld => "Rest of World",
    }
}

impl Region {
    /// Countries reported under this region. Empty when the region is only
    /// reported as a whole.
    pub const fn countries(self) -> &'static [&'static str] {
        match self {
            Region::NorthAmerica => &["United States", "Canada", "Mexico"],
            Region::Europe => &["Germany", "France", "United Kingdom"],
            Region::AsiaPacific => &["China", "Japan", "India"],
            Region::RestOfWorld => &[],
        }
    }

    /// Country labels used in records: the country list, or the region
    /// name itself when there is none.
    pub fn reporting_countries(self) -> Vec<&'static str> {
        match self.countries() {
            [] => vec![self.as_str()],
            list => list.to_vec(),
        }
    }
}

labeled_enum! {
    /// Physical form of the product.
    ProductForm ("product form") {
        Cream => "Cream",
        Gel => "Gel",
        Liquid => "Liquid",
        Powder => "Powder",
        Spray => "Spray",
        Stick => "Stick",
        Oil => "Oil",
        Sheet => "Sheet",
    }
}

labeled_enum! {
    /// Price positioning of the product.
    PriceRange ("price range") {
        Mass => "Mass",
        Premium => "Premium",
        Luxury => "Luxury",
    }
}

labeled_enum! {
    /// Consumer age bracket.
    AgeGroup ("age group") {
        Age18To24 => "18-24",
        Age25To34 => "25-34",
        Age35To49 => "35-49",
        Age50Plus => "50+",
    }
}

labeled_enum! {
    /// Consumer occupation.
    Profession ("profession") {
        Student => "Student",
        WorkingProfessional => "Working Professional",
        Homemaker => "Homemaker",
        Retired => "Retired",
    }
}

labeled_enum! {
    /// Fulfilment mode, derived from the top-level sales channel.
    DistributionChannel ("distribution channel") {
        Offline => "Offline",
        Online => "Online",
    }
}

impl DistributionChannel {
    /// Offline when the sales channel sits under the `Offline` branch of the
    /// sales-channel taxonomy, online otherwise.
    pub fn for_sales_channel(channel: &CategoryPath) -> Self {
        if channel.root_name() == DistributionChannel::Offline.as_str() {
            DistributionChannel::Offline
        } else {
            DistributionChannel::Online
        }
    }
}

/// One synthetic observation of the market. Immutable once generated.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketRecord {
    /// Unique id, assigned in generation order from 100000.
    pub record_id: u64,
    pub year: u16,
    pub region: Region,
    /// Country name, or the region name for regions without a country split.
    pub country: &'static str,
    /// Leaf of the product taxonomy.
    pub product_type: CategoryPath,
    pub product_form: ProductForm,
    pub price_range: PriceRange,
    pub age_group: AgeGroup,
    pub profession: Profession,
    /// Leaf of the sales-channel taxonomy.
    pub sales_channel: CategoryPath,
    pub distribution_channel: DistributionChannel,
    /// Unit price in USD (2 dp).
    pub price: f64,
    pub volume_units: u64,
    /// `price * volume_units` (2 dp).
    pub revenue: f64,
    /// Revenue with +/-10% market noise (2 dp).
    pub market_value_usd: f64,
    pub market_share_pct: f64,
    pub cagr: f64,
    pub yoy_growth: f64,
    pub qty: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip_through_from_str() {
        for region in Region::ALL {
            assert_eq!(region.as_str().parse::<Region>().unwrap(), *region);
        }
        assert_eq!("luxury".parse::<PriceRange>().unwrap(), PriceRange::Luxury);
        assert_eq!(" 50+ ".parse::<AgeGroup>().unwrap(), AgeGroup::Age50Plus);
    }

    #[test]
    fn unknown_label_is_reported_with_its_kind() {
        let err = "Antarctica".parse::<Region>().unwrap_err();
        assert_eq!(
            err,
            ParseError::UnknownLabel {
                kind: "region",
                value: "Antarctica".to_string()
            }
        );
    }

    #[test]
    fn serde_uses_literal_labels() {
        let s = serde_json::to_string(&Profession::WorkingProfessional).unwrap();
        assert_eq!(s, "\"Working Professional\"");
        let back: AgeGroup = serde_json::from_str("\"25-34\"").unwrap();
        assert_eq!(back, AgeGroup::Age25To34);
    }

    #[test]
    fn region_without_countries_reports_itself() {
        assert_eq!(
            Region::RestOfWorld.reporting_countries(),
            vec!["Rest of World"]
        );
        assert_eq!(Region::Europe.reporting_countries().len(), 3);
    }

    #[test]
    fn distribution_follows_top_level_channel() {
        let offline = CategoryPath::root("Offline")
            .child("Department Stores")
            .unwrap();
        let online = CategoryPath::root("Online")
            .child("Brand Websites")
            .unwrap();
        assert_eq!(
            DistributionChannel::for_sales_channel(&offline),
            DistributionChannel::Offline
        );
        assert_eq!(
            DistributionChannel::for_sales_channel(&online),
            DistributionChannel::Online
        );
    }
}
