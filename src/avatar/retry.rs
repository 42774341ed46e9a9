use std::thread;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Retry {
    attempts: u32,
    delay: Duration,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RetryExhausted<E> {
    pub attempts: u32,
    pub last: E,
}

impl Retry {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// The closure receives the 1-based attempt number.
    pub fn run<T, E>(
        &self,
        mut operation: impl FnMut(u32) -> Result<T, E>,
    ) -> Result<T, RetryExhausted<E>> {
        let mut attempt = 1;
        loop {
            match operation(attempt) {
                Ok(value) => return Ok(value),
                Err(last) if attempt >= self.attempts => {
                    return Err(RetryExhausted {
                        attempts: attempt,
                        last,
                    });
                }
                Err(_) => {
                    if !self.delay.is_zero() {
                        thread::sleep(self.delay);
                    }
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for Retry {
    fn default() -> Self {
        Self::new(3, Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_at_first_success() {
        let mut calls = 0;
        let result: Result<u32, RetryExhausted<&str>> = Retry::default().run(|attempt| {
            calls += 1;
            if attempt < 2 { Err("down") } else { Ok(attempt) }
        });

        assert_eq!(result, Ok(2));
        assert_eq!(calls, 2);
    }

    #[test]
    fn reports_last_error_when_budget_is_spent() {
        let result: Result<(), _> = Retry::default().run(|attempt| Err(format!("attempt {attempt}")));

        assert_eq!(
            result,
            Err(RetryExhausted {
                attempts: 3,
                last: "attempt 3".to_owned(),
            })
        );
    }

    #[test]
    fn zero_attempts_still_tries_once() {
        let retry = Retry::new(0, Duration::ZERO);
        let mut calls = 0;
        let _ = retry.run(|_| -> Result<(), ()> {
            calls += 1;
            Err(())
        });

        assert_eq!(retry.attempts(), 1);
        assert_eq!(calls, 1);
    }
}
