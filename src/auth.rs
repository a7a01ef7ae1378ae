use anyhow::{Result, bail};
use std::io::{self, BufRead, IsTerminal};
use zeroize::Zeroizing;

const MIN_PIN_DIGITS: usize = 4;
const MAX_PIN_DIGITS: usize = 6;

fn validate_pin(pin: &str) -> Result<()> {
    if pin.len() < MIN_PIN_DIGITS
        || pin.len() > MAX_PIN_DIGITS
        || !pin.bytes().all(|b| b.is_ascii_digit())
    {
        bail!("PIN must be {MIN_PIN_DIGITS}-{MAX_PIN_DIGITS} digits");
    }
    Ok(())
}

pub fn read_pin() -> Result<Zeroizing<String>> {
    //  Environment Variable
    //  HABITLOCK_PIN=1234 habitlock show
    if let Ok(pin) = std::env::var("HABITLOCK_PIN") {
        if !pin.is_empty() {
            validate_pin(&pin)?;
            return Ok(Zeroizing::new(pin));
        }
    }

    //  stdin (Pipeline)
    //  echo "1234" | habitlock show
    if !io::stdin().is_terminal() {
        let mut buf = String::new();
        io::stdin().read_line(&mut buf)?;
        let pin = buf.trim_end().to_string();

        if !pin.is_empty() {
            validate_pin(&pin)?;
            return Ok(Zeroizing::new(pin));
        }
    }

    //  Interactive (TTY)
    if io::stdin().is_terminal() {
        let pin = rpassword::prompt_password("PIN: ")?;
        if !pin.is_empty() {
            validate_pin(&pin)?;
            return Ok(Zeroizing::new(pin));
        }
    }

    bail!("No PIN provided")
}

pub fn read_new_pin_with_confirmation() -> Result<Zeroizing<String>> {
    if !io::stdin().is_terminal() {
        let stdin = io::stdin();
        let mut handle = stdin.lock();

        let mut pin1 = Zeroizing::new(String::new());
        let mut pin2 = Zeroizing::new(String::new());

        handle.read_line(&mut pin1)?;
        handle.read_line(&mut pin2)?;

        trim_newline(&mut pin1);
        trim_newline(&mut pin2);

        validate_pin(&pin1)?;

        if pin1 != pin2 {
            bail!("PINs do not match");
        }

        return Ok(pin1);
    }

    let pin1 = rpassword::prompt_password("New PIN: ")?;
    let pin2 = rpassword::prompt_password("Confirm PIN: ")?;

    validate_pin(&pin1)?;

    if pin1 != pin2 {
        bail!("PINs do not match");
    }

    Ok(Zeroizing::new(pin1))
}

fn trim_newline(s: &mut String) {
    while s.ends_with('\n') || s.ends_with('\r') {
        s.pop();
    }
}
