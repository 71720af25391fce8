//! Built-in game vocabulary: branches, gods, species and backgrounds.
//!
//! Configuration is validated against these tables at load time so that a
//! rule naming a place or god that does not exist fails before any scoring.

/// Every branch the game knows about, with its multi-level flag.
pub const BRANCHES: &[(&str, bool)] = &[
    ("D", true),
    ("Lair", true),
    ("Temple", false),
    ("Orc", true),
    ("Vaults", true),
    ("Snake", true),
    ("Swamp", true),
    ("Shoals", true),
    ("Spider", true),
    ("Elf", true),
    ("Zig", true),
    ("Depths", true),
    ("Abyss", true),
    ("Sewer", false),
    ("Pan", false),
    ("Crypt", true),
    ("Slime", true),
    ("Zot", true),
    ("Ossuary", false),
    ("IceCv", false),
    ("Hell", false),
    ("Gauntlet", false),
    ("Bailey", false),
    ("Volcano", false),
    ("Tomb", true),
    ("Dis", true),
    ("Tar", true),
    ("Geh", true),
    ("Coc", true),
    ("Bazaar", false),
    ("WizLab", false),
    ("Trove", false),
    ("Desolation", false),
];

/// Branches that hold a rune.
pub const RUNE_BRANCHES: &[&str] = &[
    "Abyss", "Coc", "Dis", "Geh", "Pan", "Swamp", "Shoals", "Slime", "Snake", "Spider", "Tar",
    "Tomb", "Vaults",
];

/// Branches counted by the "Nth branch entered" rules. This is not the same
/// set as the multi-level flag in [`BRANCHES`]: Pan is counted here.
pub const MULTI_LEVEL_BRANCHES: &[&str] = &[
    "Abyss", "Coc", "Dis", "Geh", "Pan", "Swamp", "Shoals", "Slime", "Snake", "Spider", "Tar",
    "Tomb", "Vaults", "Lair", "D", "Depths", "Zot", "Orc", "Elf", "Zig", "Crypt",
];

/// Hell branches plus Pandemonium.
pub const HELL_BRANCHES: &[&str] = &["Coc", "Geh", "Dis", "Tar", "Pan"];

/// Pseudo-god used when a week allows playing without a god.
pub const NO_GOD: &str = "GOD_NO_GOD";

/// Gods whose worship alone grants champion status.
pub const WORSHIP_CHAMPION_GODS: &[&str] = &["Xom", "Gozag"];

pub const GODS: &[&str] = &[
    "Ashenzari",
    NO_GOD,
    "Beogh",
    "Cheibriados",
    "Dithmenos",
    "Elyvilon",
    "Fedhas",
    "Gozag",
    "Hepliaklqana",
    "Ignis",
    "Jiyva",
    "Kikubaaqudgha",
    "Lugonu",
    "Makhleb",
    "Nemelex Xobeh",
    "Okawaru",
    "Qazlal",
    "Ru",
    "Sif Muna",
    "The Shining One",
    "Trog",
    "Uskayaw",
    "Vehumet",
    "Xom",
    "Yredelemnul",
    "Zin",
    "Wu Jian",
];

pub const SPECIES: &[&str] = &[
    "At", "Ba", "Co", "DE", "Dg", "Dj", "Dr", "Ds", "Fe", "Fo", "Gh", "Gn", "Gr", "Hu", "Ko",
    "Mf", "Mi", "MD", "Mu", "Na", "On", "Op", "Sp", "Te", "Tr", "VS", "Vp",
    // Retired species still show up in older seasons.
    "DD", "HO", "Ce", "Ha", "Og", "LO", "SE", "HE", "Pl",
];

pub const BACKGROUNDS: &[&str] = &[
    "AE", "Al", "Ar", "Be", "Br", "CA", "CK", "Cj", "De", "EE", "En", "FE", "Fi", "Fw", "Gl", "Hu",
    "HW", "Hs", "IE", "Mo", "Ne", "Re", "Sh", "Su", "Wn", "Wr",
    // Retired backgrounds.
    "AK", "As", "AM", "Pr", "St", "VM", "Th", "Wz", "Tm",
];

pub fn is_branch(name: &str) -> bool {
    BRANCHES.iter().any(|(branch, _)| *branch == name)
}

/// Whether `name` is a branch with more than one floor. Unknown names are not.
pub fn is_multilevel(name: &str) -> bool {
    BRANCHES
        .iter()
        .any(|(branch, multilevel)| *branch == name && *multilevel)
}

pub fn is_god(name: &str) -> bool {
    GODS.contains(&name)
}

pub fn is_species(short: &str) -> bool {
    SPECIES.contains(&short)
}

pub fn is_background(short: &str) -> bool {
    BACKGROUNDS.contains(&short)
}
