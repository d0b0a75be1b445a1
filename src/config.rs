use std::env;
use std::str::FromStr;

/// Settlement constants shared by the balance engine and the task counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementRules {
    pub min_withdraw_amount: i64,
    pub task_rate_limit_seconds: i64,
    pub max_tasks_per_day: i32,
    pub lock_period_days: i64,
    pub sponsor_bonus_percent: i64,
}

impl Default for SettlementRules {
    fn default() -> Self {
        Self {
            min_withdraw_amount: 50_000,
            task_rate_limit_seconds: 10,
            max_tasks_per_day: 20,
            lock_period_days: 30,
            sponsor_bonus_percent: 10,
        }
    }
}

impl SettlementRules {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let defaults = Self::default();

        let rules = Self {
            min_withdraw_amount: env_or("MIN_WITHDRAW_AMOUNT", defaults.min_withdraw_amount)?,
            task_rate_limit_seconds: env_or(
                "TASK_RATE_LIMIT_SECONDS",
                defaults.task_rate_limit_seconds
            )?,
            max_tasks_per_day: env_or("MAX_TASKS_PER_DAY", defaults.max_tasks_per_day)?,
            lock_period_days: env_or("LOCK_PERIOD_DAYS", defaults.lock_period_days)?,
            sponsor_bonus_percent: env_or(
                "SPONSOR_BONUS_PERCENT",
                defaults.sponsor_bonus_percent
            )?,
        };

        if rules.min_withdraw_amount <= 0 || rules.max_tasks_per_day <= 0 {
            return Err("MIN_WITHDRAW_AMOUNT and MAX_TASKS_PER_DAY must be positive".into());
        }
        if rules.task_rate_limit_seconds < 0 || rules.lock_period_days < 0 {
            return Err("TASK_RATE_LIMIT_SECONDS and LOCK_PERIOD_DAYS cannot be negative".into());
        }
        if !(0..=100).contains(&rules.sponsor_bonus_percent) {
            return Err("SPONSOR_BONUS_PERCENT must be between 0 and 100".into());
        }

        Ok(rules)
    }

    /// Sponsor bonus in minor units, floored to a whole unit.
    pub fn sponsor_bonus(&self, amount: i64) -> i64 {
        amount.saturating_mul(self.sponsor_bonus_percent) / 100
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub admin_token: String,
    pub rules: SettlementRules,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenv::dotenv().ok();

        let database_url = env::var("DATABASE_URL")?;

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()?;

        let admin_token = env::var("ADMIN_TOKEN")?;
        if admin_token.len() < 16 {
            return Err("ADMIN_TOKEN must be at least 16 characters".into());
        }

        let rules = SettlementRules::from_env()?;

        Ok(Config {
            database_url,
            server_host,
            server_port,
            admin_token,
            rules,
        })
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T, Box<dyn std::error::Error>>
    where T: FromStr, <T as FromStr>::Err: std::error::Error + 'static
{
    match env::var(key) {
        Ok(value) => Ok(value.trim().parse::<T>()?),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules() {
        let rules = SettlementRules::default();

        assert_eq!(rules.min_withdraw_amount, 50_000);
        assert_eq!(rules.task_rate_limit_seconds, 10);
        assert_eq!(rules.max_tasks_per_day, 20);
        assert_eq!(rules.lock_period_days, 30);
    }

    #[test]
    fn test_sponsor_bonus_floors() {
        let rules = SettlementRules::default();

        assert_eq!(rules.sponsor_bonus(500_000), 50_000);
        assert_eq!(rules.sponsor_bonus(123_457), 12_345);
        assert_eq!(rules.sponsor_bonus(9), 0);
    }
}
