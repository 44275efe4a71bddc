/// Device initialisation and interfacing.
use super::{
    encoder::{EncoderArray, PositionalEncoder},
    matrix::KeyMatrix,
};
use fugit::RateExtU32;
use rp2040_hal::clocks::PeripheralClock;
use rp_pico::{
    hal::{
        clocks,
        gpio::{
            pin::bank0::{Gpio26, Gpio27},
            FunctionI2C, Pin,
        },
        pac::{self, I2C1, RESETS, TIMER},
        sio::Sio,
        timer::{monotonic::Monotonic, Alarm0},
        usb::UsbBus,
        Timer, Watchdog, I2C,
    },
    Pins, XOSC_CRYSTAL_FREQ,
};
use ssd1306::{mode::BufferedGraphicsMode, prelude::*, I2CDisplayInterface, Ssd1306};

// type alias for display pins
type DisplaySdaPin = Pin<Gpio26, FunctionI2C>;
type DisplaySclPin = Pin<Gpio27, FunctionI2C>;
pub type DisplayPins = (DisplaySdaPin, DisplaySclPin);

// minimidi-specific display type
pub type Display = Ssd1306<
    I2CInterface<I2C<I2C1, DisplayPins>>,
    DisplaySize128x64,
    BufferedGraphicsMode<DisplaySize128x64>,
>;

pub fn setup(
    mut pac: pac::Peripherals,
) -> (KeyMatrix, EncoderArray, Display, UsbBus, Monotonic<Alarm0>) {
    // setup gpio pins
    let sio = Sio::new(pac.SIO);
    let pins = Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    // setup clocks
    let mut watchdog = Watchdog::new(pac.WATCHDOG);
    let clocks = clocks::init_clocks_and_plls(
        XOSC_CRYSTAL_FREQ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .ok()
    .expect("init_clocks_and_plls(...) should succeed");

    // setup key matrix: rows on gpio 0-5, columns on gpio 6-12
    let matrix = KeyMatrix::new(
        [
            pins.gpio0.into(),
            pins.gpio1.into(),
            pins.gpio2.into(),
            pins.gpio3.into(),
            pins.gpio4.into(),
            pins.gpio5.into(),
        ],
        [
            pins.gpio6.into(),
            pins.gpio7.into(),
            pins.gpio8.into(),
            pins.gpio9.into(),
            pins.gpio10.into(),
            pins.gpio11.into(),
            pins.gpio12.into(),
        ],
    );

    // setup encoders
    let encoders = [
        PositionalEncoder::new(pins.gpio21.into(), pins.gpio20.into()),
        PositionalEncoder::new(pins.gpio16.into(), pins.gpio17.into()),
    ];

    // setup display
    let display = new_display(
        pac.I2C1,
        pins.gpio26.into_mode::<FunctionI2C>(),
        pins.gpio27.into_mode::<FunctionI2C>(),
        &mut pac.RESETS,
        &clocks.peripheral_clock,
    );

    // setup USB, vbus detection is forced because the pico has no vbus sense pin
    let usb_bus = UsbBus::new(
        pac.USBCTRL_REGS,
        pac.USBCTRL_DPRAM,
        clocks.usb_clock,
        true,
        &mut pac.RESETS,
    );

    (
        matrix,
        encoders,
        display,
        usb_bus,
        new_monotonic_timer(pac.TIMER, &mut pac.RESETS),
    )
}

fn new_monotonic_timer(timer: TIMER, resets: &mut RESETS) -> Monotonic<Alarm0> {
    // setup monotonic timer for rtic
    let mut timer = Timer::new(timer, resets);
    let monotonic_alarm = timer.alarm_0().expect("should get alarm_0");
    Monotonic::new(timer, monotonic_alarm)
}

fn new_display(
    i2c: I2C1,
    sda_pin: DisplaySdaPin,
    scl_pin: DisplaySclPin,
    resets: &mut RESETS,
    peripheral_clock: &PeripheralClock,
) -> Display {
    let i2c_bus = I2C::i2c1(i2c, sda_pin, scl_pin, 1.MHz(), resets, peripheral_clock);

    let mut display = Ssd1306::new(
        I2CDisplayInterface::new_alternate_address(i2c_bus),
        DisplaySize128x64,
        DisplayRotation::Rotate0,
    )
    .into_buffered_graphics_mode();

    display.init().expect("display.init() should succeed");

    display
}
