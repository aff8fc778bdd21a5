pub mod server;

pub mod settings {
    use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};

    pub const SETTINGS_FILE: &str = "campus";
    pub const ENV_PREFIX: &str = "CAMPUS";

    #[derive(Clone, Debug, serde::Deserialize, serde::Serialize, PartialEq)]
    pub struct Settings {
        pub site: Site,
        pub app: AppInfo,
    }

    #[derive(Clone, Debug, serde::Deserialize, serde::Serialize, PartialEq)]
    pub struct Site {
        pub address: String,
        pub root: String,
    }

    /// Fields of the web-app manifest.
    #[derive(Clone, Debug, serde::Deserialize, serde::Serialize, PartialEq)]
    pub struct AppInfo {
        pub name: String,
        pub short_name: String,
        pub theme_color: String,
        pub background_color: String,
    }

    impl Settings {
        pub fn new_from_file() -> Result<Self, ConfigError> {
            Self::builder()?
                .add_source(File::with_name(SETTINGS_FILE).required(false))
                .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
                .build()?
                .try_deserialize()
        }

        fn builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
            Config::builder()
                .set_default("site.address", "0.0.0.0:3000")?
                .set_default("site.root", "dist")?
                .set_default("app.name", "Student Senior")?
                .set_default("app.short_name", "Senior")?
                .set_default("app.theme_color", "#1e1e2e")?
                .set_default("app.background_color", "#1e1e2e")
        }

        pub fn new_testing(root: impl Into<String>) -> Self {
            Self {
                site: Site {
                    address: "127.0.0.1:0".to_string(),
                    root: root.into(),
                },
                app: AppInfo {
                    name: "Student Senior".to_string(),
                    short_name: "Senior".to_string(),
                    theme_color: "#1e1e2e".to_string(),
                    background_color: "#1e1e2e".to_string(),
                },
            }
        }
    }

    #[cfg(test)]
    mod settings_tests {
        use super::*;
        use pretty_assertions::assert_eq;
        use test_log::test;

        #[test]
        fn test_defaults() {
            let settings: Settings = Settings::builder()
                .unwrap()
                .build()
                .unwrap()
                .try_deserialize()
                .unwrap();
            assert_eq!(settings.site.address, "0.0.0.0:3000");
            assert_eq!(settings.site.root, "dist");
            assert_eq!(settings.app.short_name, "Senior");
        }

        #[test]
        fn test_override() {
            let settings: Settings = Settings::builder()
                .unwrap()
                .set_override("site.root", "public")
                .unwrap()
                .build()
                .unwrap()
                .try_deserialize()
                .unwrap();
            assert_eq!(settings.site.root, "public");
            assert_eq!(settings.site.address, "0.0.0.0:3000");
        }
    }
}
