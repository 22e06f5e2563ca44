/// MQTT client wrapper: telemetry publishing and the control subscription
use esp_idf_hal::delay::FreeRtos;
use esp_idf_svc::mqtt::client::{EspMqttClient, EventPayload, MqttClientConfiguration, QoS};
use log::{info, warn};
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use trackbox::ControlCommand;

pub struct MqttClient {
    client: EspMqttClient<'static>,
    connected: Arc<AtomicBool>,
    /// Set on every (re)connect; the subscription is renewed from the main loop
    resubscribe: Arc<AtomicBool>,
    control_topic: &'static str,
}

impl MqttClient {
    /// Connect to the broker and route control messages to `clear_requested`.
    ///
    /// The callback runs on the MQTT task, so it only decodes the payload and
    /// raises the flag; the main loop applies the command.
    pub fn new(
        broker_url: &str,
        client_id: &'static str,
        control_topic: &'static str,
        clear_requested: Arc<AtomicBool>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let mqtt_config = MqttClientConfiguration {
            client_id: Some(client_id),
            keep_alive_interval: Some(core::time::Duration::from_secs(30)),
            network_timeout: core::time::Duration::from_secs(5),
            ..Default::default()
        };

        let connected = Arc::new(AtomicBool::new(false));
        let resubscribe = Arc::new(AtomicBool::new(false));
        let connected_cb = connected.clone();
        let resubscribe_cb = resubscribe.clone();

        info!("Creating MQTT client for {}", broker_url);
        let client = EspMqttClient::new_cb(broker_url, &mqtt_config, move |event| {
            match event.payload() {
                EventPayload::Connected(_) => {
                    info!("MQTT: Connected event received");
                    connected_cb.store(true, Ordering::SeqCst);
                    resubscribe_cb.store(true, Ordering::SeqCst);
                }
                EventPayload::Disconnected => {
                    info!("MQTT: Disconnected event received");
                    connected_cb.store(false, Ordering::SeqCst);
                }
                EventPayload::Received { data, .. } => match ControlCommand::from_json(data) {
                    Ok(command) if command.clears_alert() => {
                        info!("MQTT: clear-alert command received");
                        clear_requested.store(true, Ordering::SeqCst);
                    }
                    Ok(_) => info!("MQTT: control command ignored"),
                    Err(e) => warn!("MQTT: {}", e),
                },
                EventPayload::Error(e) => {
                    warn!("MQTT: Error event: {:?}", e);
                }
                _ => {}
            }
        })?;

        info!("MQTT client created, waiting for connection (up to 5s)");

        let start = unsafe { esp_idf_svc::sys::esp_timer_get_time() };
        let timeout_us = 5_000_000i64;

        while !connected.load(Ordering::SeqCst) {
            let elapsed = unsafe { esp_idf_svc::sys::esp_timer_get_time() } - start;
            if elapsed > timeout_us {
                return Err("MQTT connection timeout - broker unreachable".into());
            }
            FreeRtos::delay_ms(100);
        }

        let mut mqtt = Self {
            client,
            connected,
            resubscribe,
            control_topic,
        };
        mqtt.maintain();
        mqtt.publish_status(client_id, "online")?;

        info!("MQTT connected successfully");
        Ok(mqtt)
    }

    /// Renew the control subscription after a (re)connect
    pub fn maintain(&mut self) {
        if !self.resubscribe.swap(false, Ordering::SeqCst) {
            return;
        }

        match self.client.subscribe(self.control_topic, QoS::AtLeastOnce) {
            Ok(_) => info!("MQTT: subscribed to {}", self.control_topic),
            Err(e) => {
                warn!("MQTT: subscribe to {} failed: {:?}", self.control_topic, e);
                self.resubscribe.store(true, Ordering::SeqCst);
            }
        }
    }

    /// Publish with QoS 0 (fire-and-forget)
    pub fn publish(&mut self, topic: &str, payload: &str) -> Result<(), Box<dyn std::error::Error>> {
        self.client
            .enqueue(topic, QoS::AtMostOnce, false, payload.as_bytes())?;
        Ok(())
    }

    fn publish_status(
        &mut self,
        device: &str,
        status: &str,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let ts = unsafe { esp_idf_svc::sys::esp_timer_get_time() / 1000 };
        let payload = json!({
            "ts": ts,
            "device": device,
            "status": status
        })
        .to_string();

        self.client
            .enqueue("trackbox/status", QoS::AtLeastOnce, true, payload.as_bytes())?;
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}
