#[allow(async_fn_in_trait)]
pub trait SettingsService {
    async fn get_settings(&self) -> Result<Settings, String>;
    async fn set_settings(&self, settings: Settings) -> Result<(), String>;
}

#[allow(async_fn_in_trait)]
pub trait SettingsRepository {
    async fn read_settings(&self) -> Result<Settings, String>;
    async fn write_settings(&self, settings: Settings) -> Result<(), String>;
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Length of the countdown before a session becomes active.
    pub countdown_seconds: u32,
    /// Time added to a running rest timer on request.
    pub rest_extension_seconds: u32,
    pub beep_volume: u8,
    pub notifications: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            countdown_seconds: 3,
            rest_extension_seconds: 30,
            beep_volume: 80,
            notifications: false,
        }
    }
}
