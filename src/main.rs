#![cfg_attr(target_arch = "riscv32", no_std)]
#![cfg_attr(target_arch = "riscv32", no_main)]

#[cfg(target_arch = "riscv32")]
use {
    embassy_net::{Config, Stack, StackResources},
    embassy_time::Delay,
    esp_hal::analog::adc::{Adc, AdcConfig, Attenuation},
    esp_hal::clock::CpuClock,
    esp_hal::gpio::{Input, InputConfig, Pull},
    esp_hal::rng::Rng,
    esp_hal::timer::timg::TimerGroup,
    esp_hal_embassy::Executor,
    esp_wifi::wifi,
    keylight_dial::board::{self, BoardSensors, LightTcpState},
    keylight_dial::config,
    keylight_dial::network::Credentials,
    keylight_dial::sync::{Forever, SyncLoop},
    keylight_dial::wifi::WiFiManager,
    log::{error, info},
    static_cell::StaticCell,
};

// Add app descriptor for espflash compatibility
#[cfg(target_arch = "riscv32")]
esp_bootloader_esp_idf::esp_app_desc!();

// Static cells for embassy components
#[cfg(target_arch = "riscv32")]
static WIFI_INIT_CELL: StaticCell<esp_wifi::EspWifiController<'static>> = StaticCell::new();
#[cfg(target_arch = "riscv32")]
static STACK_RESOURCES: StaticCell<StackResources<4>> = StaticCell::new();
#[cfg(target_arch = "riscv32")]
static LIGHT_TCP_STATE: StaticCell<LightTcpState> = StaticCell::new();
#[cfg(target_arch = "riscv32")]
static EXECUTOR: StaticCell<Executor> = StaticCell::new();

#[cfg(target_arch = "riscv32")]
#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    esp_println::println!("[PANIC] {}", info);
    loop {}
}

// Embassy task to run the network stack
#[cfg(target_arch = "riscv32")]
#[embassy_executor::task]
async fn net_task(
    mut runner: embassy_net::Runner<'static, esp_wifi::wifi::WifiDevice<'static>>,
) -> ! {
    runner.run().await
}

/// Joins WiFi, then mirrors the dial onto the light until an error stops it
#[cfg(target_arch = "riscv32")]
#[embassy_executor::task]
async fn sync_task(
    mut wifi_manager: WiFiManager<'static>,
    stack: Stack<'static>,
    sensors: BoardSensors,
) {
    let credentials = Credentials::from_build_env();
    let session = |_ip| {
        let light = board::light_client(stack, LIGHT_TCP_STATE.init(LightTcpState::new()));
        info!("[HTTP] Light session for {}", light.url());
        SyncLoop::new(sensors, light, Delay)
    };

    let result = keylight_dial::app::run(&mut wifi_manager, &credentials, session, Forever).await;
    if let Err(e) = result {
        error!("[MAIN] Stopped: {}", e);
    }
}

#[cfg(target_arch = "riscv32")]
#[esp_hal::main]
fn main() -> ! {
    esp_println::logger::init_logger(log::LevelFilter::Info);
    info!("[MAIN] keylight-dial {}", keylight_dial::VERSION);

    let hal_config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(hal_config);

    // Initialize heap allocator for WiFi (72KB)
    esp_alloc::heap_allocator!(size: 72 * 1024);

    // Initialize embassy time system
    let timer_group0 = TimerGroup::new(peripherals.TIMG0);
    esp_hal_embassy::init(timer_group0.timer0);

    // Initialize WiFi driver
    let timer_group1 = TimerGroup::new(peripherals.TIMG1);
    let mut rng = Rng::new(peripherals.RNG);
    let seed = (rng.random() as u64) << 32 | rng.random() as u64;
    let wifi_init = match esp_wifi::init(timer_group1.timer0, rng, peripherals.RADIO_CLK) {
        Ok(wifi_init) => wifi_init,
        Err(e) => {
            error!("[WIFI] Driver initialization failed: {:?}", e);
            panic!("WiFi driver initialization failed");
        }
    };
    let wifi_init_ref = WIFI_INIT_CELL.init(wifi_init);

    let (wifi_controller, wifi_interfaces) = match wifi::new(wifi_init_ref, peripherals.WIFI) {
        Ok(parts) => parts,
        Err(e) => {
            error!("[WIFI] Controller creation failed: {:?}", e);
            panic!("WiFi controller creation failed");
        }
    };

    // Create embassy-net stack with DHCP configuration
    let stack_resources = STACK_RESOURCES.init(StackResources::new());
    let net_config = Config::dhcpv4(Default::default());
    let (stack, runner) = embassy_net::new(wifi_interfaces.sta, net_config, stack_resources, seed);
    let wifi_manager = WiFiManager::new(wifi_controller, stack);
    info!("[WIFI] Embassy-net stack created with DHCP configuration");

    // Potentiometer and light sensor on ADC1, button with pull-down.
    // Keep in step with the pin numbers in `config`.
    info!(
        "[SENSOR] Potentiometer GPIO{}, light sensor GPIO{}, button GPIO{}",
        config::POTENTIOMETER_PIN,
        config::LIGHT_SENSOR_PIN,
        config::BUTTON_PIN
    );
    let mut adc_config = AdcConfig::new();
    let potentiometer = adc_config.enable_pin(peripherals.GPIO2, Attenuation::_11dB);
    let light = adc_config.enable_pin(peripherals.GPIO3, Attenuation::_11dB);
    let adc = Adc::new(peripherals.ADC1, adc_config);
    let button = Input::new(peripherals.GPIO5, InputConfig::default().with_pull(Pull::Down));
    let sensors = BoardSensors::new(adc, potentiometer, light, button);

    let executor = EXECUTOR.init(Executor::new());
    executor.run(|spawner| {
        info!("[MAIN] Spawning network task...");
        spawner.spawn(net_task(runner)).ok();

        info!("[MAIN] Spawning sync task...");
        if let Err(e) = spawner.spawn(sync_task(wifi_manager, stack, sensors)) {
            error!("[MAIN] Failed to spawn sync task: {:?}", e);
        }
    });
}

#[cfg(not(target_arch = "riscv32"))]
fn main() {
    eprintln!("keylight-dial is ESP32-C3 firmware; build it for riscv32imc-unknown-none-elf");
}
