#![no_std]
#![no_main]

// Required for ESP-IDF bootloader compatibility
esp_bootloader_esp_idf::esp_app_desc!();

use core::cell::RefCell;

use critical_section::Mutex;
use embassy_executor::SendSpawner;
use esp_backtrace as _;
use esp_hal::delay::Delay;
use esp_hal::gpio::{Event, Input, InputConfig, Io, Level, Output, OutputConfig, OutputPin, Pull};
use esp_hal::handler;
use esp_hal::interrupt::software::SoftwareInterruptControl;
use esp_hal::interrupt::Priority;
use esp_hal::timer::timg::TimerGroup;
use esp_rtos::embassy::{Executor, InterruptExecutor};
use static_cell::StaticCell;

use indicator_firmware::blink::Blinker;
use indicator_firmware::config::{pins, priorities, timing, TaskPriority};
use indicator_firmware::gpio::{Button, HalButton, HalIndicator, Polarity};
use indicator_firmware::load::LoadProfile;
use indicator_firmware::mode::MODE_FLAGS;
use indicator_firmware::press::{Debouncer, EdgeOutcome, PressHandler, ACK_LINK, PRESS_QUEUE};
use indicator_firmware::startup::{bring_up, Board};
use indicator_firmware::tasks;

type BoardIndicator = HalIndicator<Output<'static>>;
type BoardButton = HalButton<Input<'static>>;

/// Button input, owned by the interrupt handler after startup
static BUTTON: Mutex<RefCell<Option<BoardButton>>> = Mutex::new(RefCell::new(None));

/// Debounce state, touched only by the interrupt handler
static DEBOUNCER: Mutex<RefCell<Debouncer>> =
    Mutex::new(RefCell::new(Debouncer::new(timing::DEBOUNCE_MS)));

/// Static executors for embassy: thread mode plus one per interrupt level
static EXECUTOR: StaticCell<Executor> = StaticCell::new();
static EXECUTOR_LEVEL1: StaticCell<InterruptExecutor<1>> = StaticCell::new();
static EXECUTOR_LEVEL2: StaticCell<InterruptExecutor<2>> = StaticCell::new();

#[esp_hal::main]
fn main() -> ! {
    esp_println::logger::init_logger(log::LevelFilter::Debug);

    let peripherals = esp_hal::init(esp_hal::Config::default());

    // Initialise the RTOS scheduler with timer - MUST be done before any async operations
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    // Lines start at their inactive level (see config::pins for the mapping)
    let board = Board {
        green: indicator(peripherals.GPIO4),
        ack_green: indicator(peripherals.GPIO5),
        red: indicator(peripherals.GPIO6),
        blue: indicator(peripherals.GPIO7),
        button: HalButton::new(
            Input::new(peripherals.GPIO1, InputConfig::default().with_pull(Pull::None)),
            pins::BUTTON_POLARITY,
        ),
    };

    let parts = match bring_up(board, &MODE_FLAGS) {
        Ok(parts) => parts,
        Err(e) => {
            log::error!("Startup failed: {:?}", e);
            idle_forever();
        }
    };

    // Button interrupt on the edge towards the pressed level
    let mut io = Io::new(peripherals.IO_MUX);
    io.set_interrupt_handler(button_interrupt);
    let mut button = parts.button;
    button.pin_mut().listen(match pins::BUTTON_POLARITY {
        Polarity::ActiveHigh => Event::RisingEdge,
        Polarity::ActiveLow => Event::FallingEdge,
    });
    critical_section::with(|cs| {
        BUTTON.borrow_ref_mut(cs).replace(button);
    });

    let sw_interrupts = SoftwareInterruptControl::new(peripherals.SW_INTERRUPT);
    let level1 = EXECUTOR_LEVEL1
        .init(InterruptExecutor::new(sw_interrupts.software_interrupt1))
        .start(Priority::Priority1);
    let level2 = EXECUTOR_LEVEL2
        .init(InterruptExecutor::new(sw_interrupts.software_interrupt2))
        .start(Priority::Priority2);

    let [green, ack_green, red, blue] = parts.blinkers;

    // Create and run the embassy executor
    let executor = EXECUTOR.init(Executor::new());
    executor.run(move |spawner| {
        let spawners = Spawners {
            thread: spawner.make_send(),
            level1,
            level2,
        };

        spawners
            .get(priorities::ALWAYS_ON_BLINK)
            .must_spawn(blink(green));
        spawners
            .get(priorities::ALWAYS_ON_BLINK)
            .must_spawn(blink(ack_green));
        spawners.get(priorities::GATED_BLINK).must_spawn(blink(red));
        spawners.get(priorities::GATED_BLINK).must_spawn(blink(blue));
        spawners.get(priorities::PRESS_WORKER).must_spawn(press_worker());
        spawners
            .get(priorities::LOAD)
            .must_spawn(load(LoadProfile::DEFAULT));
        spawners.get(priorities::STATUS).must_spawn(status());
    })
}

fn indicator(pin: impl OutputPin + 'static) -> BoardIndicator {
    let inactive = Level::from(BoardIndicator::inactive_level(pins::INDICATOR_POLARITY));
    HalIndicator::new(
        Output::new(pin, inactive, OutputConfig::default()),
        pins::INDICATOR_POLARITY,
    )
}

/// Park after a failed startup without spawning anything
fn idle_forever() -> ! {
    let delay = Delay::new();
    loop {
        delay.delay_millis(1000);
    }
}

/// Spawner for each scheduling class
struct Spawners {
    thread: SendSpawner,
    level1: SendSpawner,
    level2: SendSpawner,
}

impl Spawners {
    fn get(&self, priority: TaskPriority) -> SendSpawner {
        match priority {
            TaskPriority::Thread => self.thread,
            TaskPriority::Level1 => self.level1,
            TaskPriority::Level2 => self.level2,
        }
    }
}

/// GPIO interrupt: debounce, then defer the press to the worker task.
///
/// Bounded work only; no logging and no waiting.
#[handler(priority = Priority::Priority3)]
fn button_interrupt() {
    critical_section::with(|cs| {
        let mut slot = BUTTON.borrow_ref_mut(cs);
        let Some(button) = slot.as_mut() else {
            return;
        };
        if !button.pin_mut().is_interrupt_set() {
            return;
        }
        button.pin_mut().clear_interrupt();

        let now_ms = embassy_time::Instant::now().as_millis();
        let outcome = DEBOUNCER
            .borrow_ref_mut(cs)
            .on_edge(now_ms, || button.is_pressed());
        if outcome == EdgeOutcome::Accepted {
            PRESS_QUEUE.submit();
        }
    });
}

#[embassy_executor::task(pool_size = 4)]
async fn blink(blinker: Blinker<BoardIndicator>) -> ! {
    tasks::blink_task(blinker, &MODE_FLAGS, &ACK_LINK).await
}

#[embassy_executor::task]
async fn press_worker() -> ! {
    tasks::press_task(PressHandler::new(&MODE_FLAGS, &PRESS_QUEUE, &ACK_LINK)).await
}

#[embassy_executor::task]
async fn load(profile: LoadProfile) -> ! {
    tasks::load_task(profile).await
}

#[embassy_executor::task]
async fn status() -> ! {
    tasks::status_task(&MODE_FLAGS).await
}
