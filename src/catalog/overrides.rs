//! Display names whose catalog id cannot be read off the item table, either
//! because the table names them differently or because several ids share one
//! display name and only the lore tells them apart.

/// Matches when every needle occurs in the lore.
pub struct LoreRule {
    pub needles: &'static [&'static str],
    pub id: &'static str,
}

pub enum Override {
    Alias(&'static str),
    /// Rules are tried in order; "COMMON" also matches "UNCOMMON", so rarer
    /// spellings come first.
    ByLore {
        rules: &'static [LoreRule],
        fallback: Option<&'static str>,
    },
}

impl Override {
    pub fn resolve(&self, lore: &str) -> Option<&'static str> {
        match self {
            Override::Alias(id) => Some(*id),
            Override::ByLore { rules, fallback } => rules
                .iter()
                .find(|r| r.needles.iter().all(|needle| lore.contains(needle)))
                .map(|r| r.id)
                .or(*fallback),
        }
    }
}

const fn rule(needles: &'static [&'static str], id: &'static str) -> LoreRule {
    LoreRule { needles, id }
}

const OBFUSCATED: &str = "§k";

pub fn lookup(name: &str) -> Option<&'static Override> {
    OVERRIDES
        .iter()
        .find(|(display, _)| *display == name)
        .map(|(_, entry)| entry)
}

static OVERRIDES: &[(&str, Override)] = &[
    ("Armor Stand", Override::Alias("ARMOR_SHOWCASE")),
    (
        "Beastmaster Crest",
        Override::ByLore {
            rules: &[
                rule(&["UNCOMMON"], "BEASTMASTER_CREST_UNCOMMON"),
                rule(&["RARE", OBFUSCATED], "BEASTMASTER_CREST_UNCOMMON"),
                rule(&["COMMON"], "BEASTMASTER_CREST_COMMON"),
                rule(&["RARE"], "BEASTMASTER_CREST_RARE"),
                rule(&["EPIC", OBFUSCATED], "BEASTMASTER_CREST_RARE"),
                rule(&["EPIC"], "BEASTMASTER_CREST_EPIC"),
                rule(&["LEGENDARY", OBFUSCATED], "BEASTMASTER_CREST_EPIC"),
                rule(&["LEGENDARY"], "BEASTMASTER_CREST_LEGENDARY"),
                rule(&["MYTHIC", OBFUSCATED], "BEASTMASTER_CREST_LEGENDARY"),
            ],
            fallback: None,
        },
    ),
    ("Cauldron", Override::Alias("CAULDRON")),
    (
        "Combat Exp Boost",
        Override::ByLore {
            rules: &[
                rule(&["UNCOMMON"], "PET_ITEM_COMBAT_SKILL_BOOST_UNCOMMON"),
                rule(&["COMMON"], "PET_ITEM_COMBAT_SKILL_BOOST_COMMON"),
                rule(&["RARE"], "PET_ITEM_COMBAT_SKILL_BOOST_RARE"),
                rule(&["EPIC"], "PET_ITEM_COMBAT_SKILL_BOOST_EPIC"),
            ],
            fallback: None,
        },
    ),
    (
        "Enchanted Book Bundle",
        Override::ByLore {
            rules: &[
                rule(&["Big Brain 3"], "ENCHANTED_BOOK_BUNDLE_BIG_BRAIN"),
                rule(&["Vicious 3"], "ENCHANTED_BOOK_BUNDLE_VICIOUS"),
            ],
            fallback: None,
        },
    ),
    (
        "Farming Exp Boost",
        Override::ByLore {
            rules: &[
                rule(&["UNCOMMON"], "PET_ITEM_FARMING_SKILL_BOOST_UNCOMMON"),
                rule(&["COMMON"], "PET_ITEM_FARMING_SKILL_BOOST_COMMON"),
                rule(&["RARE"], "PET_ITEM_FARMING_SKILL_BOOST_RARE"),
                rule(&["EPIC"], "PET_ITEM_FARMING_SKILL_BOOST_EPIC"),
            ],
            fallback: None,
        },
    ),
    (
        "Fishing Exp Boost",
        Override::ByLore {
            rules: &[
                rule(&["UNCOMMON"], "PET_ITEM_FISHING_SKILL_BOOST_UNCOMMON"),
                rule(&["COMMON"], "PET_ITEM_FISHING_SKILL_BOOST_COMMON"),
                rule(&["RARE"], "PET_ITEM_FISHING_SKILL_BOOST_RARE"),
                rule(&["EPIC"], "PET_ITEM_FISHING_SKILL_BOOST_EPIC"),
            ],
            fallback: None,
        },
    ),
    ("Flamebreaker Helmet", Override::Alias("FLAME_BREAKER_HELMET")),
    ("Flamebreaker Chestplate", Override::Alias("FLAME_BREAKER_CHESTPLATE")),
    ("Flamebreaker Leggings", Override::Alias("FLAME_BREAKER_LEGGINGS")),
    ("Flamebreaker Boots", Override::Alias("FLAME_BREAKER_BOOTS")),
    ("Flower Pot", Override::Alias("FANCY_FLOWER_POT")),
    (
        "Foraging Exp Boost",
        Override::ByLore {
            rules: &[
                rule(&["COMMON"], "PET_ITEM_FORAGING_SKILL_BOOST_COMMON"),
                rule(&["EPIC"], "PET_ITEM_FORAGING_SKILL_BOOST_EPIC"),
            ],
            fallback: None,
        },
    ),
    (
        "God Potion",
        Override::ByLore {
            rules: &[
                rule(&["Legacy"], "GOD_POTION"),
                rule(&["EPIC"], "GOD_POTION_2"),
            ],
            fallback: None,
        },
    ),
    (
        "Griffin Upgrade Stone",
        Override::ByLore {
            rules: &[
                rule(&["COMMON"], "GRIFFIN_UPGRADE_STONE_UNCOMMON"),
                rule(&["RARE"], "GRIFFIN_UPGRADE_STONE_RARE"),
                rule(&["EPIC"], "GRIFFIN_UPGRADE_STONE_EPIC"),
                rule(&["LEGENDARY"], "GRIFFIN_UPGRADE_STONE_LEGENDARY"),
            ],
            fallback: None,
        },
    ),
    ("Helmet of the Rising Sun", Override::Alias("ARMOR_OF_THE_RESISTANCE_HELMET")),
    ("Chestplate of the Rising Sun", Override::Alias("ARMOR_OF_THE_RESISTANCE_CHESTPLATE")),
    ("Leggings of the Rising Sun", Override::Alias("ARMOR_OF_THE_RESISTANCE_LEGGINGS")),
    ("Boots of the Rising Sun", Override::Alias("ARMOR_OF_THE_RESISTANCE_BOOTS")),
    ("Staff of the Rising Sun", Override::Alias("HOPE_OF_THE_RESISTANCE")),
    (
        "Mining Exp Boost",
        Override::ByLore {
            rules: &[
                rule(&["COMMON"], "PET_ITEM_MINING_SKILL_BOOST_COMMON"),
                rule(&["RARE"], "PET_ITEM_MINING_SKILL_BOOST_RARE"),
            ],
            fallback: None,
        },
    ),
    ("Saddle", Override::Alias("PET_ITEM_SADDLE")),
    (
        "Salmon Helmet",
        Override::ByLore {
            rules: &[rule(&["RARE"], "SALMON_HELMET_NEW")],
            fallback: Some("SALMON_HELMET"),
        },
    ),
    (
        "Salmon Chestplate",
        Override::ByLore {
            rules: &[rule(&["RARE"], "SALMON_CHESTPLATE_NEW")],
            fallback: Some("SALMON_CHESTPLATE"),
        },
    ),
    (
        "Salmon Leggings",
        Override::ByLore {
            rules: &[rule(&["RARE"], "SALMON_LEGGINGS_NEW")],
            fallback: Some("SALMON_LEGGINGS"),
        },
    ),
    (
        "Salmon Boots",
        Override::ByLore {
            rules: &[rule(&["RARE"], "SALMON_BOOTS_NEW")],
            fallback: Some("SALMON_BOOTS"),
        },
    ),
    (
        "Shimmer Skin",
        Override::ByLore {
            rules: &[
                rule(&["Superior"], "SUPERIOR_SHIMMER"),
                rule(&["Strong"], "STRONG_SHIMMER"),
                rule(&["Unstable"], "UNSTABLE_SHIMMER"),
                rule(&["Young"], "YOUNG_SHIMMER"),
                rule(&["Wise"], "WISE_SHIMMER"),
                rule(&["Holy"], "HOLY_SHIMMER"),
                rule(&["Old"], "OLD_SHIMMER"),
                rule(&["Protector"], "PROTECTOR_SHIMMER"),
            ],
            fallback: None,
        },
    ),
    (
        "Baby Skin",
        Override::ByLore {
            rules: &[
                rule(&["Superior"], "SUPERIOR_BABY"),
                rule(&["Strong"], "STRONG_BABY"),
                rule(&["Unstable"], "UNSTABLE_BABY"),
                rule(&["Young"], "YOUNG_BABY"),
                rule(&["Wise"], "WISE_BABY"),
                rule(&["Holy"], "HOLY_BABY"),
                rule(&["Old"], "OLD_BABY"),
                rule(&["Protector"], "PROTECTOR_BABY"),
            ],
            fallback: None,
        },
    ),
    ("Silex", Override::Alias("SIL_EX")),
    ("Small Backpack", Override::Alias("SMALL_BACKPACK")),
    ("Spirit Bow", Override::Alias("ITEM_SPIRIT_BOW")),
];
