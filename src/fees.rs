use alloy_primitives::utils::{ParseUnits, format_units, parse_units};
use alloy_primitives::{Address, U256};

use crate::config::{BPS_DENOMINATOR, MAX_MESSAGE_LEN, TipBounds};
use crate::error::ValidationError;
use crate::models::{FeeBreakdown, TipForm, WalletContext};

const DISPLAY_DECIMALS: u8 = 18;

/// Fee preview for the amount field. Empty, unparsable and non-positive
/// amounts yield a zero fee and zero net.
pub fn calculate_fees(amount: &str, fee_bps: u32) -> FeeBreakdown {
    let zero = || FeeBreakdown {
        platform_fee: "0".to_string(),
        net_amount: "0".to_string(),
        total: amount.to_string(),
    };

    let Some(value) = parse_amount(amount) else {
        return zero();
    };
    if value <= 0.0 {
        return zero();
    }

    let platform_fee = value * f64::from(fee_bps) / f64::from(BPS_DENOMINATOR);
    let net_amount = value - platform_fee;

    FeeBreakdown {
        platform_fee: format!("{platform_fee:.2}"),
        net_amount: format!("{net_amount:.2}"),
        total: amount.to_string(),
    }
}

/// Checks the form in the order the tip button is gated. Amounts are
/// compared in token base units; the balance check is skipped while the
/// balance is still unknown.
pub fn validate_tip(
    form: &TipForm,
    bounds: &TipBounds,
    ctx: &WalletContext,
    balance: Option<U256>,
) -> Result<(), ValidationError> {
    let recipient = form.recipient.trim();
    if recipient.is_empty() {
        return Err(ValidationError::MissingRecipient);
    }
    if form.amount.trim().is_empty() {
        return Err(ValidationError::MissingAmount);
    }
    if !ctx.is_connected() {
        return Err(ValidationError::WalletNotConnected);
    }

    let below_minimum = || ValidationError::BelowMinimum {
        amount: form.amount.clone(),
        min: bounds.min_display(),
    };
    let amount = match to_base_units(&form.amount, bounds.decimals) {
        Some(units) => units,
        None if parse_amount(&form.amount).is_some_and(|v| v < 0.0) => {
            return Err(below_minimum());
        }
        None => return Err(ValidationError::NotANumber(form.amount.clone())),
    };

    if amount < U256::from(bounds.min) {
        return Err(below_minimum());
    }
    if amount > U256::from(bounds.max) {
        return Err(ValidationError::AboveMaximum {
            amount: form.amount.clone(),
            max: bounds.max_display(),
        });
    }

    if let Some(balance) = balance {
        if amount > balance {
            return Err(ValidationError::InsufficientBalance {
                amount: form.amount.clone(),
                balance: format_units(balance, bounds.decimals)
                    .unwrap_or_else(|_| balance.to_string()),
            });
        }
    }

    if form.message.chars().count() > MAX_MESSAGE_LEN {
        return Err(ValidationError::MessageTooLong {
            max: MAX_MESSAGE_LEN,
        });
    }

    recipient
        .parse::<Address>()
        .map_err(|_| ValidationError::InvalidRecipient(recipient.to_string()))?;

    Ok(())
}

pub fn is_form_valid(
    form: &TipForm,
    bounds: &TipBounds,
    ctx: &WalletContext,
    balance: Option<U256>,
) -> bool {
    validate_tip(form, bounds, ctx, balance).is_ok()
}

/// An unknown allowance or an amount that does not convert to base units
/// keeps the approve action in front of the tip action.
pub fn needs_approval(amount: &str, allowance: Option<U256>, decimals: u8) -> bool {
    let Some(allowance) = allowance else {
        return true;
    };
    match to_base_units(amount, decimals) {
        Some(required) => allowance < required,
        None => true,
    }
}

/// Plain decimal amount to base units. Negative amounts, exponent forms and
/// anything else `parse_units` rejects yield `None`.
pub fn to_base_units(amount: &str, decimals: u8) -> Option<U256> {
    let amount = amount.trim();
    if amount.is_empty() {
        return None;
    }
    match parse_units(amount, decimals).ok()? {
        ParseUnits::U256(units) => Some(units),
        ParseUnits::I256(_) => None,
    }
}

/// Display value of an amount, accepted only in the decimal syntax the
/// base-unit conversion understands.
fn parse_amount(amount: &str) -> Option<f64> {
    let amount = amount.trim();
    parse_units(amount, DISPLAY_DECIMALS).ok()?;
    let value = amount.parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PLATFORM_FEE_BPS;

    fn ctx() -> WalletContext {
        WalletContext {
            address: Some(Address::repeat_byte(0xaa)),
            chain_id: crate::config::SEPOLIA,
        }
    }

    fn form(amount: &str) -> TipForm {
        TipForm {
            recipient: format!("{}", Address::repeat_byte(0x11)),
            amount: amount.to_string(),
            ..TipForm::default()
        }
    }

    #[test]
    fn one_percent_of_ten() {
        let fees = calculate_fees("10.00", PLATFORM_FEE_BPS);
        assert_eq!(fees.platform_fee, "0.10");
        assert_eq!(fees.net_amount, "9.90");
        assert_eq!(fees.total, "10.00");
    }

    #[test]
    fn empty_and_garbage_amounts_have_zero_fees() {
        let empty = calculate_fees("", PLATFORM_FEE_BPS);
        assert_eq!(
            empty,
            FeeBreakdown {
                platform_fee: "0".to_string(),
                net_amount: "0".to_string(),
                total: String::new(),
            }
        );

        let garbage = calculate_fees("abc", PLATFORM_FEE_BPS);
        assert_eq!(garbage.platform_fee, "0");
        assert_eq!(garbage.total, "abc");
        assert_eq!(calculate_fees("NaN", PLATFORM_FEE_BPS).net_amount, "0");
    }

    #[test]
    fn non_positive_amounts_have_zero_fees() {
        for amount in ["0", "-5", "-0.01"] {
            let fees = calculate_fees(amount, PLATFORM_FEE_BPS);
            assert_eq!(fees.platform_fee, "0", "amount={amount}");
            assert_eq!(fees.net_amount, "0", "amount={amount}");
        }
    }

    #[test]
    fn fee_plus_net_equals_amount() {
        for amount in ["0.1", "1", "3.33", "10", "99.99", "1234.5", "10000"] {
            let fees = calculate_fees(amount, PLATFORM_FEE_BPS);
            let fee: f64 = fees.platform_fee.parse().expect("fee");
            let net: f64 = fees.net_amount.parse().expect("net");
            let original: f64 = amount.parse().expect("amount");
            assert!((fee + net - original).abs() <= 0.01, "amount={amount}");
        }
    }

    #[test]
    fn bounds_are_inclusive() {
        let bounds = TipBounds::default();
        assert!(is_form_valid(&form("0.1"), &bounds, &ctx(), None));
        assert!(is_form_valid(&form("10000"), &bounds, &ctx(), None));
        assert!(!is_form_valid(&form("0.099999"), &bounds, &ctx(), None));
        assert!(!is_form_valid(&form("10000.000001"), &bounds, &ctx(), None));
    }

    #[test]
    fn below_minimum_is_rejected() {
        let err = validate_tip(&form("0.05"), &TipBounds::default(), &ctx(), None)
            .expect_err("below min");
        assert!(matches!(err, ValidationError::BelowMinimum { .. }));
    }

    #[test]
    fn empty_amount_and_recipient_are_rejected() {
        let bounds = TipBounds::default();
        assert_eq!(
            validate_tip(&form(""), &bounds, &ctx(), None),
            Err(ValidationError::MissingAmount)
        );

        let mut no_recipient = form("1");
        no_recipient.recipient.clear();
        assert_eq!(
            validate_tip(&no_recipient, &bounds, &ctx(), None),
            Err(ValidationError::MissingRecipient)
        );
    }

    #[test]
    fn disconnected_wallet_is_rejected() {
        let disconnected = WalletContext {
            address: None,
            chain_id: crate::config::SEPOLIA,
        };
        assert_eq!(
            validate_tip(&form("1"), &TipBounds::default(), &disconnected, None),
            Err(ValidationError::WalletNotConnected)
        );
    }

    #[test]
    fn balance_is_checked_only_when_known() {
        let bounds = TipBounds::default();
        let five_usdc = U256::from(5_000_000u64);
        assert!(is_form_valid(&form("5"), &bounds, &ctx(), Some(five_usdc)));
        assert!(!is_form_valid(&form("5.01"), &bounds, &ctx(), Some(five_usdc)));
        assert!(is_form_valid(&form("5.01"), &bounds, &ctx(), None));
    }

    #[test]
    fn exponent_amounts_are_not_numbers() {
        let bounds = TipBounds::default();
        assert_eq!(
            validate_tip(&form("1e1"), &bounds, &ctx(), None),
            Err(ValidationError::NotANumber("1e1".to_string()))
        );
        assert_eq!(calculate_fees("1e1", PLATFORM_FEE_BPS).platform_fee, "0");
        assert_eq!(to_base_units("1e1", 6), None);
    }

    #[test]
    fn negative_amounts_do_not_convert() {
        assert_eq!(to_base_units("-1", 6), None);
        assert_eq!(to_base_units("1", 6), Some(U256::from(1_000_000u64)));
        assert!(matches!(
            validate_tip(&form("-1"), &TipBounds::default(), &ctx(), None),
            Err(ValidationError::BelowMinimum { .. })
        ));
    }

    #[test]
    fn long_message_is_rejected() {
        let mut long = form("1");
        long.message = "x".repeat(MAX_MESSAGE_LEN + 1);
        assert_eq!(
            validate_tip(&long, &TipBounds::default(), &ctx(), None),
            Err(ValidationError::MessageTooLong {
                max: MAX_MESSAGE_LEN
            })
        );
    }

    #[test]
    fn approval_compares_allowance_with_base_units() {
        assert!(needs_approval("10", None, 6));
        assert!(needs_approval("", Some(U256::MAX), 6));
        assert!(needs_approval("10", Some(U256::from(9_999_999u64)), 6));
        assert!(!needs_approval("10", Some(U256::from(10_000_000u64)), 6));
    }
}
