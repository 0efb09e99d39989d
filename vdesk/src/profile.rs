use crate::error::VirtualDesktopError;
use crate::guid::Guid;
use serde::Serialize;
use strum::Display;

/// The oldest build any profile covers.
pub const BASELINE_BUILD: u32 = 9000;
pub const RENAME_BUILD: u32 = 19041;
pub const WALLPAPER_BUILD: u32 = 21313;
/// The first profile whose desktop table is known to carry `GetName` right after `GetID`.
///
/// The 20231 and 21313 profiles also span the 21H2 family (22000 to 22620), where a
/// monitor slot sits between the two and several manager slots take a monitor argument.
/// That variant is not modelled, so naming stays off below this threshold.
pub const NAMED_SLOTS_BUILD: u32 = 22621;

/// How the desktop and manager tables are laid out past their stable prefixes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Display)]
pub enum SlotLayout {
    /// Desktops expose only their id; the manager tail is create, remove, find.
    Win10,
    /// Desktops carry a name and wallpaper; the manager tail adds move and the setters.
    Win11,
    /// As `Win11`, with an extra switch-and-move-foreground slot ahead of create.
    Win11ForegroundSwitch,
}

impl SlotLayout {
    pub fn has_named_desktops(self) -> bool {
        !matches!(self, Self::Win10)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Profile {
    /// The threshold this profile was selected by.
    pub minimum_build: u32,
    /// The build it was resolved for.
    pub build: u32,
    pub desktop_iid: Guid,
    pub manager_iid: Guid,
    pub layout: SlotLayout,
    pub supports_rename: bool,
    pub supports_wallpaper: bool,
}

struct Entry {
    minimum_build: u32,
    desktop_iid: Guid,
    manager_iid: Guid,
    layout: SlotLayout,
}

const DESKTOP_22621: Guid = Guid::from_u128(0x3F07F4BE_B107_441A_AF0F_39D82529072C);

// highest threshold first
const PROFILES: [Entry; 6] = [
    Entry {
        minimum_build: 26100,
        desktop_iid: DESKTOP_22621,
        manager_iid: Guid::from_u128(0x53F5CA0B_158F_4124_900C_057158060B27),
        layout: SlotLayout::Win11ForegroundSwitch,
    },
    Entry {
        minimum_build: 22631,
        desktop_iid: DESKTOP_22621,
        manager_iid: Guid::from_u128(0x4970BA3D_FD4E_4647_BEA3_D89076EF4B9C),
        layout: SlotLayout::Win11,
    },
    Entry {
        minimum_build: 22621,
        desktop_iid: DESKTOP_22621,
        manager_iid: Guid::from_u128(0xA3175F2D_239C_4BD2_8AA0_EEBA8B0B138E),
        layout: SlotLayout::Win11,
    },
    Entry {
        minimum_build: 21313,
        desktop_iid: Guid::from_u128(0x536D3495_B208_4CC9_AE26_DE8111275BF8),
        manager_iid: Guid::from_u128(0xB2F925B9_5A0F_4D2E_9F4D_2B1507593C10),
        layout: SlotLayout::Win11,
    },
    Entry {
        minimum_build: 20231,
        desktop_iid: Guid::from_u128(0x62FDF88B_11CA_4AFB_8BD8_2296DFAE49E2),
        manager_iid: Guid::from_u128(0x094AFE11_44F2_4BA0_976F_29A97E263EE0),
        layout: SlotLayout::Win11,
    },
    Entry {
        minimum_build: BASELINE_BUILD,
        desktop_iid: Guid::from_u128(0xFF72FFDD_BE7E_43FC_9C03_AD81681E88E4),
        manager_iid: Guid::from_u128(0xF31574D6_B682_4CDC_BD56_1827860ABEC6),
        layout: SlotLayout::Win10,
    },
];

impl Profile {
    /// Picks the entry with the highest threshold not above `build`.
    ///
    /// Builds newer than every known threshold land on the newest entry. Nothing checks
    /// that such a build still honours that entry's layout; a mismatch only shows up as a
    /// failed call.
    pub fn resolve(build: u32) -> Result<Self, VirtualDesktopError> {
        let entry = PROFILES
            .iter()
            .find(|entry| build >= entry.minimum_build)
            .ok_or(VirtualDesktopError::UnsupportedBuild {
                build,
                baseline: BASELINE_BUILD,
            })?;

        let newest = PROFILES[0].minimum_build;
        if build > newest {
            tracing::debug!("build {build} is newer than every known profile, using {newest}");
        }

        Ok(Self {
            minimum_build: entry.minimum_build,
            build,
            desktop_iid: entry.desktop_iid,
            manager_iid: entry.manager_iid,
            layout: entry.layout,
            supports_rename: build >= RENAME_BUILD,
            supports_wallpaper: build >= WALLPAPER_BUILD,
        })
    }

    pub fn thresholds() -> impl Iterator<Item = u32> {
        PROFILES.iter().map(|entry| entry.minimum_build)
    }

    fn has_verified_name_slots(&self) -> bool {
        self.layout.has_named_desktops() && self.minimum_build >= NAMED_SLOTS_BUILD
    }

    pub fn can_name_desktops(&self) -> bool {
        self.supports_rename && self.has_verified_name_slots()
    }

    pub fn can_set_wallpaper(&self) -> bool {
        self.supports_wallpaper && self.has_verified_name_slots()
    }
}
