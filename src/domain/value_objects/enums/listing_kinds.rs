use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

/// Kind of listing a promotion is bought for.
///
/// Billboards and digital screens are stored in sibling tables and a listing
/// created as one kind may live in the other table, so both are checked.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ListingKind {
    #[serde(alias = "billboards")]
    Billboard,
    #[serde(alias = "digital_screens", alias = "digital-screens", alias = "digital-screen")]
    DigitalScreen,
    #[serde(alias = "jobs")]
    Job,
}

/// Backing table holding listings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ListingCollection {
    Billboards,
    DigitalScreens,
    Jobs,
}

const BILLBOARD_PROBE_ORDER: [ListingCollection; 2] = [
    ListingCollection::Billboards,
    ListingCollection::DigitalScreens,
];
const DIGITAL_SCREEN_PROBE_ORDER: [ListingCollection; 2] = [
    ListingCollection::DigitalScreens,
    ListingCollection::Billboards,
];
const JOB_PROBE_ORDER: [ListingCollection; 1] = [ListingCollection::Jobs];

impl ListingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingKind::Billboard => "billboard",
            ListingKind::DigitalScreen => "digital_screen",
            ListingKind::Job => "job",
        }
    }

    /// Tables that may hold a listing of this kind, in lookup order.
    pub fn candidate_collections(&self) -> &'static [ListingCollection] {
        match self {
            ListingKind::Billboard => &BILLBOARD_PROBE_ORDER,
            ListingKind::DigitalScreen => &DIGITAL_SCREEN_PROBE_ORDER,
            ListingKind::Job => &JOB_PROBE_ORDER,
        }
    }

    pub fn primary_collection(&self) -> ListingCollection {
        self.candidate_collections()[0]
    }
}

impl FromStr for ListingKind {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "billboard" | "billboards" => Ok(ListingKind::Billboard),
            "digital_screen" | "digital_screens" | "digital-screen" | "digital-screens" => {
                Ok(ListingKind::DigitalScreen)
            }
            "job" | "jobs" => Ok(ListingKind::Job),
            other => Err(anyhow::anyhow!("unknown listing kind: {other}")),
        }
    }
}

impl Display for ListingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ListingCollection {
    pub const ALL: [ListingCollection; 3] = [
        ListingCollection::Billboards,
        ListingCollection::DigitalScreens,
        ListingCollection::Jobs,
    ];

    pub fn table_name(&self) -> &'static str {
        match self {
            ListingCollection::Billboards => "billboards",
            ListingCollection::DigitalScreens => "digital_screens",
            ListingCollection::Jobs => "jobs",
        }
    }
}

impl Display for ListingCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table_name())
    }
}
