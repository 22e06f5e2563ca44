/// Station-mode WiFi uplink for telemetry
///
/// An empty password joins an open network.
use esp_idf_hal::{modem::Modem, peripheral::Peripheral};
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};
use esp_idf_svc::{eventloop::EspSystemEventLoop, nvs::EspDefaultNvsPartition};
use log::info;

pub struct WifiManager {
    wifi: BlockingWifi<EspWifi<'static>>,
}

impl WifiManager {
    pub fn new(
        modem: impl Peripheral<P = Modem> + 'static,
        sysloop: EspSystemEventLoop,
        nvs: Option<EspDefaultNvsPartition>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let driver = EspWifi::new(modem, sysloop.clone(), nvs)?;
        Ok(Self {
            wifi: BlockingWifi::wrap(driver, sysloop)?,
        })
    }

    /// Join `ssid` and block until DHCP has assigned an address
    pub fn connect(&mut self, ssid: &str, password: &str) -> Result<(), Box<dyn std::error::Error>> {
        let auth_method = if password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };

        self.wifi
            .set_configuration(&Configuration::Client(ClientConfiguration {
                ssid: ssid.try_into().map_err(|_| "SSID too long")?,
                password: password.try_into().map_err(|_| "WiFi password too long")?,
                auth_method,
                ..Default::default()
            }))?;

        self.wifi.start()?;
        info!("WiFi started, joining {} ({:?})", ssid, auth_method);
        self.wifi.connect()?;
        self.wifi.wait_netif_up()?;

        let ip = self.wifi.wifi().sta_netif().get_ip_info()?.ip;
        info!("Uplink ready, IP {}", ip);

        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }
}
