//! Built-in catalog tables.
//!
//! Tier 0 holds the starter kit and a threshold-0 monster so every player
//! can always hunt something. Tier 11 is the hidden mystical tier.

/// (id, name, tier, attack, gems, rarity)
pub(super) const WEAPONS: &[(&str, &str, i32, i64, i64, &str)] = &[
    ("w0", "Wooden Stick", 0, 5, 0, "brown"),
    ("w1", "Rusty Sword", 1, 5, 0, "common"),
    ("w2", "Wooden Club", 1, 6, 0, "common"),
    ("w3", "Short Dagger", 2, 9, 0, "common"),
    ("w4", "Hunting Spear", 2, 11, 0, "uncommon"),
    ("w5", "Iron Blade", 3, 16, 0, "uncommon"),
    ("w6", "War Hammer", 3, 18, 0, "uncommon"),
    ("w7", "Steel Longsword", 4, 24, 1, "rare"),
    ("w8", "Reinforced Axe", 4, 26, 1, "rare"),
    ("w9", "Flanged Mace", 5, 33, 1, "rare"),
    ("w10", "Keen Rapier", 5, 35, 1, "rare"),
    ("w11", "Knight's Claymore", 6, 44, 2, "epic"),
    ("w12", "Stormcaller Spear", 6, 46, 2, "epic"),
    ("w13", "Dragonfang Blade", 7, 58, 3, "epic"),
    ("w14", "Titan Maul", 7, 62, 3, "epic"),
    ("w15", "Void Edge", 8, 78, 4, "legendary"),
    ("w16", "Sunforged Halberd", 8, 82, 4, "legendary"),
    ("w17", "Abyssal Cleaver", 9, 100, 6, "mythic"),
    ("w18", "Celestial Pike", 9, 104, 6, "mythic"),
    ("w19", "Eternal Greatsword", 10, 130, 8, "ancient"),
    ("w20", "Mythic Soulblade", 11, 220, 20, "mystical"),
];

/// (id, name, tier, defense, gems, rarity)
pub(super) const GEAR: &[(&str, &str, i32, i64, i64, &str)] = &[
    ("g0", "Worn Rags", 0, 3, 0, "brown"),
    ("g1", "Cloth Tunic", 1, 2, 0, "common"),
    ("g2", "Leather Vest", 1, 3, 0, "common"),
    ("g3", "Padded Jacket", 2, 6, 0, "common"),
    ("g4", "Studded Leather", 2, 8, 0, "uncommon"),
    ("g5", "Chain Shirt", 3, 12, 0, "uncommon"),
    ("g6", "Scale Mail", 3, 14, 0, "uncommon"),
    ("g7", "Brigandine", 4, 20, 1, "rare"),
    ("g8", "Iron Plate", 4, 22, 1, "rare"),
    ("g9", "Knight's Guard", 5, 30, 1, "rare"),
    ("g10", "Guardian Mail", 5, 32, 1, "rare"),
    ("g11", "Tempered Cuirass", 6, 40, 2, "epic"),
    ("g12", "Aegis Plate", 6, 42, 2, "epic"),
    ("g13", "Dragonhide Armor", 7, 54, 3, "epic"),
    ("g14", "Stormguard Vest", 7, 56, 3, "epic"),
    ("g15", "Celestial Mail", 8, 70, 4, "legendary"),
    ("g16", "Sunplate Armor", 8, 74, 4, "legendary"),
    ("g17", "Abyssal Shroud", 9, 92, 6, "mythic"),
    ("g18", "Eternal Breastplate", 9, 96, 6, "mythic"),
    ("g19", "Worldbreaker Armor", 10, 120, 8, "ancient"),
    ("g20", "Mystic Wardrobe", 11, 200, 20, "mystical"),
];

/// (id, name, tier, threshold, gems)
pub(super) const MONSTERS: &[(&str, &str, i32, i64, i64)] = &[
    ("m0", "Training Dummy", 0, 0, 1),
    ("m1", "Rat", 1, 15, 1),
    ("m2", "Wild Boar", 1, 15, 1),
    ("m3", "Giant Spider", 2, 40, 1),
    ("m4", "Forest Wolf", 2, 40, 1),
    ("m5", "Bandit", 3, 75, 3),
    ("m6", "Ogre Brute", 3, 75, 3),
    ("m7", "Stone Golem", 4, 120, 4),
    ("m8", "Warg Rider", 4, 120, 4),
    ("m9", "Harpy", 5, 175, 6),
    ("m10", "Troll", 5, 175, 6),
    ("m11", "Wyvern", 6, 240, 8),
    ("m12", "Ironclad Knight", 6, 240, 8),
    ("m13", "Basilisk", 7, 315, 11),
    ("m14", "Fire Drake", 7, 315, 11),
    ("m15", "Storm Elemental", 8, 400, 13),
    ("m16", "Titan Warden", 8, 400, 13),
    ("m17", "Leviathan Spawn", 9, 495, 17),
    ("m18", "Void Reaver", 9, 495, 17),
    ("m19", "Ancient Colossus", 10, 600, 20),
    ("m20", "Mythic Seraph", 11, 715, 24),
];
