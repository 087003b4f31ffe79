//! Raw ESP-IDF GPIO access and wall-switch interrupt registration.
//!
//! Thin wrappers over `gpio_config` / `gpio_set_level` / `gpio_get_level`
//! used by [`GpioAdapter`](crate::adapters::gpio::GpioAdapter), plus the
//! ISR plumbing that feeds [`INPUT_EDGES`](crate::events::INPUT_EDGES).
//! Host builds get no-op simulation fallbacks.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

use crate::app::ports::PinMode;
use crate::app::toggle::InputId;

// ── Error type ────────────────────────────────────────────────

/// ESP-IDF return code of a failed GPIO call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
    GpioWriteFailed(i32),
    IsrInstallFailed(i32),
    IsrRegisterFailed(i32),
}

impl HwInitError {
    pub const fn code(self) -> i32 {
        match self {
            Self::GpioConfigFailed(rc)
            | Self::GpioWriteFailed(rc)
            | Self::IsrInstallFailed(rc)
            | Self::IsrRegisterFailed(rc) => rc,
        }
    }
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc)  => write!(f, "GPIO config failed (rc={})", rc),
            Self::GpioWriteFailed(rc)   => write!(f, "GPIO set level failed (rc={})", rc),
            Self::IsrInstallFailed(rc)  => write!(f, "GPIO ISR service install failed (rc={})", rc),
            Self::IsrRegisterFailed(rc) => write!(f, "GPIO interrupt setup failed (rc={})", rc),
        }
    }
}

// ── GPIO configuration ────────────────────────────────────────

/// Reset `pin` and apply direction and pulls.  Interrupts stay disabled
/// until [`register_input_isr`].
#[cfg(target_os = "espidf")]
pub fn gpio_configure(pin: i32, mode: PinMode) -> Result<(), HwInitError> {
    use crate::app::ports::PinDirection;

    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pin,
        mode: match mode.direction {
            PinDirection::Input => gpio_mode_t_GPIO_MODE_INPUT,
            // Input+output so the commanded level can be read back.
            PinDirection::Output => gpio_mode_t_GPIO_MODE_INPUT_OUTPUT,
        },
        pull_up_en: if mode.pull_up {
            gpio_pullup_t_GPIO_PULLUP_ENABLE
        } else {
            gpio_pullup_t_GPIO_PULLUP_DISABLE
        },
        pull_down_en: if mode.pull_down {
            gpio_pulldown_t_GPIO_PULLDOWN_ENABLE
        } else {
            gpio_pulldown_t_GPIO_PULLDOWN_DISABLE
        },
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        ..Default::default()
    };

    // SAFETY: plain register configuration of a validated GPIO number;
    // called from the main task only.
    let ret = unsafe {
        let ret = gpio_reset_pin(pin);
        if ret != ESP_OK as i32 {
            ret
        } else {
            gpio_config(&cfg)
        }
    };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::GpioConfigFailed(ret));
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_configure(_pin: i32, _mode: PinMode) -> Result<(), HwInitError> {
    Ok(())
}

// ── GPIO levels ───────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) -> Result<(), HwInitError> {
    // SAFETY: gpio_set_level writes to an already-configured output pin.
    let ret = unsafe { gpio_set_level(pin, u32::from(high)) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::GpioWriteFailed(ret));
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) -> Result<(), HwInitError> {
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: gpio_get_level is a read-only register access.
    (unsafe { gpio_get_level(pin) }) != 0
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(_pin: i32) -> bool {
    false
}

// ── GPIO ISR Service ──────────────────────────────────────────

/// Pack `pin` and `input` into the ISR registration argument.
#[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
const fn isr_arg(pin: i32, input: InputId) -> usize {
    ((input.raw() as usize) << 8) | (pin as u8 as usize)
}

#[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
const fn isr_arg_parts(arg: usize) -> (i32, InputId) {
    ((arg & 0xFF) as i32, InputId::new((arg >> 8) as u8))
}

/// Any-edge handler shared by every wall switch.  Samples the pin level
/// here so a press and release landing between two loop ticks both reach
/// the debouncer.
#[cfg(target_os = "espidf")]
unsafe extern "C" fn wall_switch_isr(arg: *mut core::ffi::c_void) {
    let (pin, input) = isr_arg_parts(arg as usize);
    // SAFETY: gpio_get_level is a read-only register access, ISR-safe.
    let high = unsafe { gpio_get_level(pin) } != 0;
    crate::events::INPUT_EDGES.push(crate::events::EdgeNotice::new(input, high));
}

/// Install the per-pin GPIO ISR service.  Call once before
/// [`register_input_isr`].
#[cfg(target_os = "espidf")]
pub fn init_isr_service() -> Result<(), HwInitError> {
    // SAFETY: ESP_ERR_INVALID_STATE means the service is already installed
    // (acceptable).
    let ret = unsafe { gpio_install_isr_service(0) };
    if ret != ESP_OK as i32 && ret != ESP_ERR_INVALID_STATE as i32 {
        return Err(HwInitError::IsrInstallFailed(ret));
    }
    info!("hw_init: GPIO ISR service installed");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_isr_service() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): ISR service skipped");
    Ok(())
}

/// Fire [`wall_switch_isr`] on both edges of `pin`, tagged with `input`.
#[cfg(target_os = "espidf")]
pub fn register_input_isr(pin: i32, input: InputId) -> Result<(), HwInitError> {
    let check = |ret: esp_err_t| {
        if ret != ESP_OK as i32 {
            Err(HwInitError::IsrRegisterFailed(ret))
        } else {
            Ok(())
        }
    };

    // SAFETY: the handler is a static function that only reads the pin and
    // pushes to the lock-free edge queue; the argument is an integer, never
    // dereferenced.
    unsafe {
        check(gpio_set_intr_type(pin, gpio_int_type_t_GPIO_INTR_ANYEDGE))?;
        check(gpio_isr_handler_add(
            pin,
            Some(wall_switch_isr),
            isr_arg(pin, input) as *mut core::ffi::c_void,
        ))?;
        if let Err(e) = check(gpio_intr_enable(pin)) {
            gpio_isr_handler_remove(pin);
            return Err(e);
        }
    }
    info!("hw_init: input {} ISR on GPIO {} (any edge)", input, pin);
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn register_input_isr(pin: i32, input: InputId) -> Result<(), HwInitError> {
    log::info!("hw_init(sim): input {} ISR on GPIO {} skipped", input, pin);
    Ok(())
}
