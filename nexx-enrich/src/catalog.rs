//! Compiled-in knowledge tables
//!
//! Both tables are ordered slices, not hash maps: the device map is searched
//! first-match-wins, so entry order is the tie-break policy. Longer, more
//! specific model names must precede their prefixes.

use nexx_common::db::ComponentReference;

/// Curated component entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownComponent {
    pub ic_number: &'static str,
    pub ic_type: &'static str,
    pub manufacturer: &'static str,
    pub function: &'static str,
    pub used_in: &'static [&'static str],
}

impl KnownComponent {
    /// Row to insert into the component reference store
    pub fn to_reference(&self) -> ComponentReference {
        ComponentReference {
            ic_number: self.ic_number.to_string(),
            ic_type: self.ic_type.to_string(),
            manufacturer: self.manufacturer.to_string(),
            function: self.function.to_string(),
            used_in: self.used_in.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Known component table
pub static KNOWN_COMPONENTS: &[KnownComponent] = &[
    // Charging ICs
    KnownComponent {
        ic_number: "U2300",
        ic_type: "Charging IC",
        manufacturer: "Texas Instruments",
        function: "USB Power Delivery / Charging",
        used_in: &["iPhone 15", "iPhone 15 Pro"],
    },
    KnownComponent {
        ic_number: "SN2611A0",
        ic_type: "Charging IC",
        manufacturer: "Texas Instruments",
        function: "Battery Charger IC",
        used_in: &["iPhone 12", "iPhone 12 Pro", "iPhone 13", "iPhone 13 Pro"],
    },
    KnownComponent {
        ic_number: "SN2501",
        ic_type: "Charging IC",
        manufacturer: "Texas Instruments",
        function: "Battery Charger IC",
        used_in: &["iPhone X", "iPhone XS", "iPhone 11"],
    },
    KnownComponent {
        ic_number: "BQ51013B",
        ic_type: "Charging IC",
        manufacturer: "Texas Instruments",
        function: "Wireless Charging Receiver",
        used_in: &["iPhone 8", "iPhone X"],
    },
    // PMIC
    KnownComponent {
        ic_number: "338S00770",
        ic_type: "PMIC",
        manufacturer: "Apple/Dialog",
        function: "Power Management IC",
        used_in: &["iPhone 15 Pro", "iPhone 15 Pro Max"],
    },
    KnownComponent {
        ic_number: "338S00456",
        ic_type: "PMIC",
        manufacturer: "Apple/Dialog",
        function: "Power Management IC",
        used_in: &["iPhone 12", "iPhone 12 Pro"],
    },
    KnownComponent {
        ic_number: "338S00383",
        ic_type: "PMIC",
        manufacturer: "Apple/Dialog",
        function: "Power Management IC",
        used_in: &["iPhone 11", "iPhone 11 Pro"],
    },
    KnownComponent {
        ic_number: "338S00309",
        ic_type: "PMIC",
        manufacturer: "Apple/Dialog",
        function: "Power Management IC",
        used_in: &["iPhone X", "iPhone XS"],
    },
    // Audio
    KnownComponent {
        ic_number: "338S00537",
        ic_type: "Audio Codec",
        manufacturer: "Cirrus Logic",
        function: "Audio Codec IC",
        used_in: &["iPhone 14", "iPhone 14 Pro"],
    },
    KnownComponent {
        ic_number: "338S00411",
        ic_type: "Audio Codec",
        manufacturer: "Cirrus Logic",
        function: "Audio Codec IC",
        used_in: &["iPhone 12", "iPhone 13"],
    },
    KnownComponent {
        ic_number: "CS42L83",
        ic_type: "Audio Codec",
        manufacturer: "Cirrus Logic",
        function: "Audio Codec",
        used_in: &["MacBook Pro 2021", "MacBook Pro 2022"],
    },
    // Modem / baseband
    KnownComponent {
        ic_number: "SDX75",
        ic_type: "Modem",
        manufacturer: "Qualcomm",
        function: "5G Modem-RF",
        used_in: &["iPhone 16", "iPhone 16 Pro"],
    },
    KnownComponent {
        ic_number: "SDX70",
        ic_type: "Modem",
        manufacturer: "Qualcomm",
        function: "5G Modem-RF",
        used_in: &["iPhone 15", "iPhone 15 Pro"],
    },
    KnownComponent {
        ic_number: "SDX65",
        ic_type: "Modem",
        manufacturer: "Qualcomm",
        function: "5G Modem-RF",
        used_in: &["iPhone 14", "iPhone 14 Pro"],
    },
    KnownComponent {
        ic_number: "SDX55",
        ic_type: "Modem",
        manufacturer: "Qualcomm",
        function: "5G Modem",
        used_in: &["iPhone 12", "iPhone 12 Pro", "iPhone 13"],
    },
    // NFC
    KnownComponent {
        ic_number: "SN210",
        ic_type: "NFC Controller",
        manufacturer: "NXP",
        function: "NFC / Secure Element",
        used_in: &["iPhone 14", "iPhone 15"],
    },
    KnownComponent {
        ic_number: "SN200",
        ic_type: "NFC Controller",
        manufacturer: "NXP",
        function: "NFC Controller",
        used_in: &["iPhone 12", "iPhone 13"],
    },
    // WiFi / Bluetooth
    KnownComponent {
        ic_number: "BCM4389",
        ic_type: "WiFi/BT",
        manufacturer: "Broadcom",
        function: "WiFi 6E + Bluetooth 5.3",
        used_in: &["iPhone 15 Pro", "iPhone 14 Pro"],
    },
    KnownComponent {
        ic_number: "BCM4387",
        ic_type: "WiFi/BT",
        manufacturer: "Broadcom",
        function: "WiFi 6 + Bluetooth 5.0",
        used_in: &["iPhone 13", "iPhone 14"],
    },
    KnownComponent {
        ic_number: "BCM4378",
        ic_type: "WiFi/BT",
        manufacturer: "Broadcom",
        function: "WiFi 6 + Bluetooth 5.0",
        used_in: &["iPhone 12"],
    },
    // Display
    KnownComponent {
        ic_number: "STB601A05",
        ic_type: "Display IC",
        manufacturer: "ST Micro",
        function: "OLED Display Driver",
        used_in: &["iPhone 14 Pro", "iPhone 15 Pro"],
    },
];

/// Look up a component by exact identifier
pub fn known_component(ic_number: &str) -> Option<&'static KnownComponent> {
    KNOWN_COMPONENTS.iter().find(|c| c.ic_number == ic_number)
}

/// Component identifiers known for one device model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceComponents {
    pub charging_ic: Option<&'static str>,
    pub power_ic: Option<&'static str>,
    pub audio_codec: Option<&'static str>,
    /// Informational; no device column receives it
    pub modem: Option<&'static str>,
}

const fn components(
    charging_ic: Option<&'static str>,
    power_ic: Option<&'static str>,
    audio_codec: Option<&'static str>,
    modem: Option<&'static str>,
) -> DeviceComponents {
    DeviceComponents {
        charging_ic,
        power_ic,
        audio_codec,
        modem,
    }
}

/// Device name → components, in match priority order
pub static DEVICE_COMPONENT_MAP: &[(&str, DeviceComponents)] = &[
    ("iPhone 15 Pro Max", components(Some("U2300"), Some("338S00770"), None, Some("SDX70"))),
    ("iPhone 15 Pro", components(Some("U2300"), Some("338S00770"), None, Some("SDX70"))),
    ("iPhone 15", components(Some("U2300"), None, None, Some("SDX70"))),
    ("iPhone 14 Pro Max", components(None, None, Some("338S00537"), Some("SDX65"))),
    ("iPhone 14 Pro", components(None, None, Some("338S00537"), Some("SDX65"))),
    ("iPhone 14", components(None, None, Some("338S00537"), Some("SDX65"))),
    ("iPhone 13 Pro Max", components(Some("SN2611A0"), Some("338S00456"), None, Some("SDX55"))),
    ("iPhone 13 Pro", components(Some("SN2611A0"), Some("338S00456"), None, Some("SDX55"))),
    ("iPhone 13", components(Some("SN2611A0"), None, Some("338S00411"), Some("SDX55"))),
    ("iPhone 12 Pro Max", components(Some("SN2611A0"), Some("338S00456"), None, Some("SDX55"))),
    ("iPhone 12 Pro", components(Some("SN2611A0"), Some("338S00456"), None, Some("SDX55"))),
    ("iPhone 12", components(Some("SN2611A0"), None, Some("338S00411"), Some("SDX55"))),
    ("iPhone 11 Pro Max", components(Some("SN2501"), Some("338S00383"), None, None)),
    ("iPhone 11 Pro", components(Some("SN2501"), Some("338S00383"), None, None)),
    ("iPhone 11", components(Some("SN2501"), Some("338S00383"), None, None)),
    ("iPhone XS Max", components(Some("SN2501"), Some("338S00309"), None, None)),
    ("iPhone XS", components(Some("SN2501"), Some("338S00309"), None, None)),
    ("iPhone X", components(Some("SN2501"), Some("338S00309"), None, None)),
    ("iPhone 16 Pro Max", components(None, None, None, Some("SDX75"))),
    ("iPhone 16 Pro", components(None, None, None, Some("SDX75"))),
    ("iPhone 16", components(None, None, None, Some("SDX75"))),
];

/// Best mapping for a device name
///
/// Exact match first; otherwise the first entry (in table order) where the
/// device name contains the key or the key contains the device name.
/// Matching is case-sensitive. An empty name never matches.
pub fn find_device_components(device_name: &str) -> Option<&'static DeviceComponents> {
    if device_name.is_empty() {
        return None;
    }

    if let Some((_, mapping)) = DEVICE_COMPONENT_MAP
        .iter()
        .find(|(key, _)| *key == device_name)
    {
        return Some(mapping);
    }

    DEVICE_COMPONENT_MAP
        .iter()
        .find(|(key, _)| device_name.contains(key) || key.contains(device_name))
        .map(|(_, mapping)| mapping)
}
