#![no_std]
#![no_main]

use defmt::{debug, info};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::{UART1, USB};
use embassy_rp::uart::{Config as UartConfig, Uart};
use embassy_rp::usb::Driver;
use embassy_time::Delay;
use embassy_usb::class::hid::{HidReader, State};
use embassy_usb::{Builder, Config as UsbConfig};
use static_cell::StaticCell;
use switch_macro::{
    configure_usb_hid, Command, EngineConfig, ReportPlayer, ScriptReceiver,
    SharedSwitchEngine, SwitchRequestHandler, UartByteSource, UsbHidOutput, REPORT_SIZE,
};

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    UART1_IRQ => embassy_rp::uart::InterruptHandler<UART1>;
    USBCTRL_IRQ => embassy_rp::usb::InterruptHandler<USB>;
});

/// Serial speed of the script link.
const UART_BAUDRATE: u32 = 9_600;

/// HORI Pokken Tournament Pro Pad. The Switch only accepts known pads.
const USB_VID: u16 = 0x0F0D;
const USB_PID: u16 = 0x0092;

const ENGINE_CONFIG: EngineConfig = EngineConfig {
    optimize: cfg!(feature = "optimize-default"),
    ..EngineConfig::DEFAULT
};

/// The playback engine, shared by the input, output and host report tasks.
static ENGINE: SharedSwitchEngine = SharedSwitchEngine::new(ENGINE_CONFIG);

/// USB device configuration buffer.
static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static MSOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();

/// HID state.
static HID_STATE: StaticCell<State> = StaticCell::new();
static CONTROL_HANDLER: StaticCell<SwitchRequestHandler> = StaticCell::new();

type UsbDriver = Driver<'static, USB>;

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("switch-macro starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    // --- UART Setup ---
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = UART_BAUDRATE;

    let uart = Uart::new(
        p.UART1,
        p.PIN_8, // TX
        p.PIN_9, // RX
        Irqs,
        p.DMA_CH0,
        p.DMA_CH1,
        uart_config,
    );
    let (tx, rx) = uart.split();
    let uart_input = UartByteSource::new(rx, tx);

    // --- USB Setup ---
    let usb_driver = Driver::new(p.USB, Irqs);

    let mut usb_config = UsbConfig::new(USB_VID, USB_PID);
    usb_config.manufacturer = Some("HORI CO.,LTD.");
    usb_config.product = Some("POKKEN CONTROLLER");
    usb_config.serial_number = None;
    usb_config.max_power = 250;
    usb_config.max_packet_size_0 = 64;

    let config_descriptor = CONFIG_DESCRIPTOR.init([0; 256]);
    let bos_descriptor = BOS_DESCRIPTOR.init([0; 256]);
    let msos_descriptor = MSOS_DESCRIPTOR.init([0; 256]);
    let control_buf = CONTROL_BUF.init([0; 64]);

    let mut builder = Builder::new(
        usb_driver,
        usb_config,
        config_descriptor,
        bos_descriptor,
        msos_descriptor,
        control_buf,
    );

    // Configure HID class
    let hid_state = HID_STATE.init(State::new());
    let control_handler = CONTROL_HANDLER.init(SwitchRequestHandler::new(&ENGINE));
    let (hid_reader, hid_writer) = configure_usb_hid(&mut builder, hid_state, control_handler);

    // Build the USB device
    let usb_device = builder.build();

    let usb_output = UsbHidOutput::new(hid_writer);

    // Optional: LED for error indication (on-board LED on Pico)
    let led = Output::new(p.PIN_25, Level::Low);

    // Spawn tasks (unwrap the SpawnToken, then spawn)
    spawner.spawn(usb_task(usb_device).unwrap());
    spawner.spawn(input_task(uart_input, led).unwrap());
    spawner.spawn(output_task(usb_output).unwrap());
    spawner.spawn(host_report_task(hid_reader).unwrap());

    info!("switch-macro initialized, waiting for scripts...");
}

/// USB device task - runs the USB stack.
#[embassy_executor::task]
async fn usb_task(mut device: embassy_usb::UsbDevice<'static, UsbDriver>) {
    device.run().await;
}

/// Input task - feeds UART bytes to the engine.
#[embassy_executor::task]
async fn input_task(input: UartByteSource<'static>, mut led: Output<'static>) {
    let mut receiver = ScriptReceiver::new(&ENGINE, input).with_echo(cfg!(feature = "uart-echo"));

    loop {
        match receiver.receive_one().await {
            Ok(Command::Publish(script)) => {
                debug!("script: {}", script);
                led.set_low();
            }
            Ok(_) => {}
            Err(_) => {
                // Already logged by the receiver; toggle LED to indicate error
                led.toggle();
            }
        }
    }
}

/// Output task - serves one engine frame per host poll.
#[embassy_executor::task]
async fn output_task(mut output: UsbHidOutput<'static>) {
    // Wait for USB to be ready
    output.wait_ready().await;
    info!("USB HID ready, serving reports...");

    ReportPlayer::new(&ENGINE, output, Delay).run().await
}

/// Host report task - reads the OUT endpoint; the engine discards what arrives.
#[embassy_executor::task]
async fn host_report_task(reader: HidReader<'static, UsbDriver, REPORT_SIZE>) {
    let mut handler = SwitchRequestHandler::new(&ENGINE);
    reader.run(false, &mut handler).await
}
