#![no_std]
#![no_main]

mod display;
mod encoder;
mod matrix;
mod midi;
mod peripherals;

use panic_probe as _;

// RTIC app module runs the app as a set of tasks modifying shared state
// this module is responsible for interfacing with the hardware
#[rtic::app(
    device = rp_pico::hal::pac,
    peripherals = true,
    dispatchers = [DMA_IRQ_0, DMA_IRQ_1, PWM_IRQ_WRAP]
)]
mod app {
    use defmt::{self, error, info, trace, warn};
    use defmt_rtt as _;
    use fugit::MicrosDurationU64;
    use midi_types::MidiMessage;
    use rp_pico::hal::{
        timer::{monotonic::Monotonic, Alarm0},
        usb::UsbBus,
    };
    use usb_device::{class_prelude::UsbBusAllocator, prelude::*};
    use usbd_midi::data::usb::constants::USB_CLASS_NONE;

    use crate::{
        display::{self, RenderView},
        encoder::EncoderArray,
        matrix::KeyMatrix,
        midi::{self, MidiStreamingClass, UsbMidi},
        peripherals::{setup, Display},
    };
    use minimidi_core::{
        Controller, ControllerConfig, CycleSink, DirtyRegions, DisplayRegion, MappingWarning,
    };

    // time between matrix/encoder scans
    // the encoders must be sampled at least this often or detents get lost
    const SCAN_INTERVAL: MicrosDurationU64 = MicrosDurationU64::millis(1);

    // time between each display render, 25 FPS
    const DISPLAY_UPDATE_INTERVAL: MicrosDurationU64 = MicrosDurationU64::millis(40);

    // pid.codes test VID/PID
    const USB_VID_PID: UsbVidPid = UsbVidPid(0x1209, 0x0001);

    /// Define RTIC monotonic timer. Also used for defmt.
    #[monotonic(binds = TIMER_IRQ_0, default = true)]
    type TimerMonotonic = Monotonic<Alarm0>;

    /// RTIC shared resources.
    #[shared]
    struct Shared {
        /// Octave shift, held notes, display summary and the previous matrix sample.
        controller: Controller,

        /// Screen regions changed since the last render.
        dirty_regions: DirtyRegions,

        usb_device: UsbDevice<'static, UsbBus>,

        /// USB-MIDI streaming interface, written by `midi_send` and polled by `usb_irq`.
        usb_midi: UsbMidi,
    }

    /// RTIC local resources.
    #[local]
    struct Local {
        matrix: KeyMatrix,

        encoders: EncoderArray,

        /// Interface to the display.
        display: Display,
    }

    /// RTIC init method sets up the hardware and initialises shared and local resources.
    #[init(local = [usb_bus: Option<UsbBusAllocator<UsbBus>> = None])]
    fn init(ctx: init::Context) -> (Shared, Local, init::Monotonics) {
        info!("[init] hello world!");

        // configure RTIC monotonic as source of timestamps for defmt
        defmt::timestamp!("{=u64:us}", {
            monotonics::now().duration_since_epoch().to_micros()
        });

        let (matrix, encoders, mut display, usb_bus, monotonic_timer) = setup(ctx.device);

        // the USB allocator has to outlive every class and device built from it
        let usb_bus: &'static UsbBusAllocator<UsbBus> =
            ctx.local.usb_bus.insert(UsbBusAllocator::new(usb_bus));
        let usb_midi = MidiStreamingClass::new(usb_bus);
        let usb_device = UsbDeviceBuilder::new(usb_bus, USB_VID_PID)
            .manufacturer("MiniMIDI")
            .product("MiniMIDI Controller")
            .serial_number("0001")
            .device_class(USB_CLASS_NONE)
            .build();

        let controller = Controller::new(ControllerConfig::default());

        // title and separators; the regions follow on the first display update
        if let Err(_) = display::render_splash_screen_view(&mut display) {
            error!("[init] could not render splash screen");
        }

        // start scheduled task to scan the matrix and encoders
        scan::spawn().expect("scan::spawn should succeed");

        // start scheduled task to update display
        update_display::spawn().expect("update_display::spawn should succeed");

        info!("[init] MiniMIDI firmware initialised");

        (
            Shared {
                controller,
                dirty_regions: DirtyRegions::all(),
                usb_device,
                usb_midi,
            },
            Local {
                matrix,
                encoders,
                display,
            },
            init::Monotonics(monotonic_timer),
        )
    }

    /// Service the USB device. Triggered by any USB controller event.
    #[task(
        binds = USBCTRL_IRQ,
        priority = 4,
        shared = [usb_device, usb_midi]
    )]
    fn usb_irq(ctx: usb_irq::Context) {
        (ctx.shared.usb_device, ctx.shared.usb_midi).lock(|usb_device, usb_midi| {
            // host-to-device MIDI is ignored, polling keeps enumeration and writes moving
            usb_device.poll(&mut [usb_midi]);
        });
    }

    /// Send a MIDI message. Implemented as a task so scanning never waits on USB.
    #[task(
        priority = 3,
        capacity = 64,
        shared = [usb_midi]
    )]
    fn midi_send(mut ctx: midi_send::Context, message: MidiMessage) {
        trace!("midi_send");
        midi::log_message(&message);
        ctx.shared.usb_midi.lock(|usb_midi| {
            if let Err(err) = midi::write(usb_midi, &message) {
                error!("[midi_send] message dropped: {}", err);
            }
        });
    }

    /// Collects the output of one controller cycle: MIDI goes to `midi_send`, redraws are
    /// batched up for `update_display`.
    struct TaskSink<'a> {
        dirty_regions: &'a mut DirtyRegions,
    }

    impl CycleSink for TaskSink<'_> {
        fn send(&mut self, message: MidiMessage) {
            if let Err(_message) = midi_send::spawn(message) {
                error!("[scan] could not spawn midi_send");
            }
        }

        fn redraw(&mut self, region: DisplayRegion) {
            self.dirty_regions.mark(region);
        }

        fn warn(&mut self, warning: MappingWarning) {
            warn!("[scan] {}", warning);
        }
    }

    /// Run one controller cycle: scan the key matrix, then both encoders.
    #[task(
        priority = 2,
        shared = [controller, dirty_regions],
        local = [matrix, encoders],
    )]
    fn scan(ctx: scan::Context) {
        let start = monotonics::now();
        trace!("[scan] start");

        let matrix = ctx.local.matrix;
        let encoders = ctx.local.encoders;
        (ctx.shared.controller, ctx.shared.dirty_regions).lock(|controller, dirty_regions| {
            let mut sink = TaskSink { dirty_regions };
            controller.run_cycle(matrix, encoders, &mut sink);
        });

        scan::spawn_after(SCAN_INTERVAL).expect("scan::spawn_after should succeed");

        trace!("[scan] elapsed_time={}", (monotonics::now() - start).to_micros());
    }

    /// Copy the display summary and hand it to `render_view` if anything changed. Rendering
    /// is slow because of I2C, so it runs outside the controller lock.
    #[task(
        priority = 1,
        shared = [controller, dirty_regions],
    )]
    fn update_display(ctx: update_display::Context) {
        let start = monotonics::now();
        trace!("[update_display] start");

        (ctx.shared.controller, ctx.shared.dirty_regions).lock(|controller, dirty_regions| {
            if dirty_regions.is_empty() {
                return;
            }
            let view = RenderView {
                summary: controller.display().clone(),
                regions: dirty_regions.take(),
            };
            if let Err(view) = render_view::spawn(view) {
                // try again next frame
                for region in view.regions.iter() {
                    dirty_regions.mark(region);
                }
            }
        });

        update_display::spawn_after(DISPLAY_UPDATE_INTERVAL)
            .expect("should be able to spawn_after update_display");

        trace!("[update_display] elapsed_time={}", (monotonics::now() - start).to_micros());
    }

    #[task(
        priority = 1,
        local = [display]
    )]
    fn render_view(ctx: render_view::Context, view: RenderView) {
        let start = monotonics::now();
        trace!("[render_view] start");

        if let Err(_) = view.render(ctx.local.display) {
            error!("RenderView::render error");
        }

        trace!("[render_view] elapsed_time={}", (monotonics::now() - start).to_micros());
    }

    // idle task needed because default RTIC idle task calls wfi(), which breaks rtt
    #[idle]
    fn task_main(_: task_main::Context) -> ! {
        loop {
            cortex_m::asm::nop();
        }
    }
}
