//! USB HID output: the Switch-facing side of the engine.

use defmt::trace;
use embassy_rp::peripherals::USB;
use embassy_rp::usb::Driver;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_usb::class::hid::{
    HidReader, HidReaderWriter, HidWriter, ReportId, RequestHandler, State,
};
use embassy_usb::control::OutResponse;
use embassy_usb::driver::EndpointError;
use embassy_usb::Builder;
use macro_core::{OutputError, ReportSink, SharedEngine, SwitchReport};

type UsbDriver<'d> = Driver<'d, USB>;

/// Engine type shared by all firmware tasks.
pub type SharedSwitchEngine = SharedEngine<CriticalSectionRawMutex>;

/// Input and output report length.
pub const REPORT_SIZE: usize = SwitchReport::SIZE;

/// Interrupt endpoint packet size.
pub const MAX_PACKET_SIZE: u16 = 64;

/// Host polling interval requested in the endpoint descriptor.
pub const POLL_MS: u8 = 5;

/// HORI Pokken Tournament Pro Pad report descriptor.
///
/// - 16 buttons
/// - 4-bit hat switch plus 4 bits of padding
/// - 4 stick axes, unsigned 8-bit, centered at 128
/// - 1 vendor byte
/// - 8-byte vendor output report
pub const REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x05, // Usage (Gamepad)
    0xA1, 0x01, // Collection (Application)
    //
    // --- Buttons (16 buttons) ---
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x35, 0x00, //   Physical Minimum (0)
    0x45, 0x01, //   Physical Maximum (1)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x10, //   Report Count (16)
    0x05, 0x09, //   Usage Page (Button)
    0x19, 0x01, //   Usage Minimum (Button 1)
    0x29, 0x10, //   Usage Maximum (Button 16)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    // --- Hat switch ---
    0x05, 0x01, //   Usage Page (Generic Desktop)
    0x25, 0x07, //   Logical Maximum (7)
    0x46, 0x3B, 0x01, //   Physical Maximum (315)
    0x75, 0x04, //   Report Size (4)
    0x95, 0x01, //   Report Count (1)
    0x65, 0x14, //   Unit (Degrees)
    0x09, 0x39, //   Usage (Hat Switch)
    0x81, 0x42, //   Input (Data, Variable, Absolute, Null State)
    0x65, 0x00, //   Unit (None)
    0x95, 0x01, //   Report Count (1)
    0x81, 0x01, //   Input (Constant) - padding nibble
    //
    // --- Sticks ---
    0x26, 0xFF, 0x00, //   Logical Maximum (255)
    0x46, 0xFF, 0x00, //   Physical Maximum (255)
    0x09, 0x30, //   Usage (X)
    0x09, 0x31, //   Usage (Y)
    0x09, 0x32, //   Usage (Z)
    0x09, 0x35, //   Usage (Rz)
    0x75, 0x08, //   Report Size (8)
    0x95, 0x04, //   Report Count (4)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    // --- Vendor byte ---
    0x06, 0x00, 0xFF, //   Usage Page (Vendor Defined 0xFF00)
    0x09, 0x20, //   Usage (0x20)
    0x95, 0x01, //   Report Count (1)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    // --- Output report ---
    0x0A, 0x21, 0x26, //   Usage (0x2621)
    0x95, 0x08, //   Report Count (8)
    0x91, 0x02, //   Output (Data, Variable, Absolute)
    //
    0xC0, // End Collection
];

/// USB HID report writer.
pub struct UsbHidOutput<'d> {
    writer: HidWriter<'d, UsbDriver<'d>, REPORT_SIZE>,
    ready: bool,
}

impl<'d> UsbHidOutput<'d> {
    /// Create a new USB HID output from the given HID writer.
    pub fn new(writer: HidWriter<'d, UsbDriver<'d>, REPORT_SIZE>) -> Self {
        Self {
            writer,
            ready: false,
        }
    }

    /// Wait until the device is ready (USB enumerated).
    pub async fn wait_ready(&mut self) {
        self.writer.ready().await;
        self.ready = true;
    }
}

impl ReportSink for UsbHidOutput<'_> {
    async fn send(&mut self, report: &SwitchReport) -> Result<(), OutputError> {
        self.writer
            .write(&report.to_bytes())
            .await
            .map_err(|e| match e {
                EndpointError::Disabled => OutputError::NotReady,
                _ => OutputError::Io,
            })
    }

    fn is_ready(&self) -> bool {
        self.ready
    }
}

/// HID request handler.
///
/// GET_REPORT is served from the engine like an interrupt IN poll.
/// SET_REPORT and OUT endpoint data are handed to the engine, which drops them.
pub struct SwitchRequestHandler {
    engine: &'static SharedSwitchEngine,
}

impl SwitchRequestHandler {
    pub const fn new(engine: &'static SharedSwitchEngine) -> Self {
        Self { engine }
    }
}

impl RequestHandler for SwitchRequestHandler {
    fn get_report(&mut self, _id: ReportId, buf: &mut [u8]) -> Option<usize> {
        let out = buf.get_mut(..REPORT_SIZE)?;
        // No waiting inside a control transfer; an extended frame goes out as is.
        let frame = self.engine.next_frame();
        out.copy_from_slice(&frame.report.to_bytes());
        Some(REPORT_SIZE)
    }

    fn set_report(&mut self, _id: ReportId, data: &[u8]) -> OutResponse {
        trace!("SET_REPORT: {} bytes", data.len());
        self.engine.accept_output_report(data);
        OutResponse::Accepted
    }

    fn set_idle_ms(&mut self, _id: Option<ReportId>, _duration_ms: u32) {}

    fn get_idle_ms(&mut self, _id: Option<ReportId>) -> Option<u32> {
        None
    }
}

/// Configure the USB HID class in the USB builder.
///
/// Returns the OUT-endpoint reader and the IN-endpoint writer.
pub fn configure_usb_hid<'d>(
    builder: &mut Builder<'d, UsbDriver<'d>>,
    state: &'d mut State<'d>,
    handler: &'d mut SwitchRequestHandler,
) -> (
    HidReader<'d, UsbDriver<'d>, REPORT_SIZE>,
    HidWriter<'d, UsbDriver<'d>, REPORT_SIZE>,
) {
    let config = embassy_usb::class::hid::Config {
        report_descriptor: REPORT_DESCRIPTOR,
        request_handler: Some(handler as &mut dyn RequestHandler),
        poll_ms: POLL_MS,
        max_packet_size: MAX_PACKET_SIZE,
        hid_subclass: embassy_usb::class::hid::HidSubclass::No,
        hid_boot_protocol: embassy_usb::class::hid::HidBootProtocol::None,
    };

    HidReaderWriter::<_, REPORT_SIZE, REPORT_SIZE>::new(builder, state, config).split()
}
