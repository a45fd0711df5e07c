//! Typed transactions parsed from extracted bank statement text.
//!
//! Statement lines start with an `MM/DD` posting date. Each such line, plus
//! any continuation lines up to the next dated line, is one record. A record
//! is classified by the first category whose pattern matches it; records that
//! match none (checks, fees, Zelle, ...) are skipped.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::PageTexts;

// An amount, optionally followed by the running-balance column.
const AMOUNT_TAIL: &str = r"\$?(?<amount>[\d,]*\d\.\d\d)(?:\s+-?\$?[\d,]*\d\.\d\d)?[ \t]*$";

fn transaction_regex(head: &str) -> Regex {
    Regex::new(&format!("(?ms)^\\s*(?<date>\\d{{2}}/\\d{{2}}){head}{AMOUNT_TAIL}")).unwrap()
}

static RECORD_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*\d{2}/\d{2}\s").unwrap());

static DEPOSIT_RE: Lazy<Regex> =
    Lazy::new(|| transaction_regex(r"\s+Orig\sCO\sName.+?Descr:Payments.+?"));

static CARD_PURCHASE_RE: Lazy<Regex> =
    Lazy::new(|| transaction_regex(r"\s+Recurring\sCard\sPurchase.+?"));

static ONLINE_PAYMENT_RE: Lazy<Regex> = Lazy::new(|| transaction_regex(r"\s.+?Xfer.+?"));

static TRANSFER_OUT_RE: Lazy<Regex> =
    Lazy::new(|| transaction_regex(r"\s.+?Online\sTransfer\sTo.+?"));

static PERIOD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?<begin>[a-z]+\s+\d{1,2},\s+\d{4})\s*through\s*(?<end>[a-z]+\s+\d{1,2},\s+\d{4})",
    )
    .unwrap()
});

static BEGINNING_BALANCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^\s*Beginning\s+Balance\s+(?<amount>-?\$?[\d,]*\d\.\d\d)").unwrap()
});

static ENDING_BALANCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^\s*Ending\s+Balance\s+(?<amount>-?\$?[\d,]*\d\.\d\d)").unwrap()
});

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TransactionError {
    #[error("invalid transaction date {date:?}")]
    InvalidDate { date: String },
    #[error("invalid amount {raw:?}")]
    InvalidAmount { raw: String },
}

/// Direction of money relative to the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Debit,
    Credit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionCategory {
    /// ACH credit whose company entry description is "Payments".
    Deposit,
    DebitCardPurchase,
    OnlinePayment,
    TransferOut,
}

impl TransactionCategory {
    /// Classification order: the first category whose pattern matches a
    /// record wins.
    pub const ALL: [TransactionCategory; 4] = [
        TransactionCategory::Deposit,
        TransactionCategory::DebitCardPurchase,
        TransactionCategory::TransferOut,
        TransactionCategory::OnlinePayment,
    ];

    pub fn kind(self) -> TransactionKind {
        match self {
            TransactionCategory::Deposit => TransactionKind::Credit,
            TransactionCategory::DebitCardPurchase
            | TransactionCategory::OnlinePayment
            | TransactionCategory::TransferOut => TransactionKind::Debit,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TransactionCategory::Deposit => "deposit",
            TransactionCategory::DebitCardPurchase => "card purchase",
            TransactionCategory::OnlinePayment => "online payment",
            TransactionCategory::TransferOut => "transfer out",
        }
    }

    fn pattern(self) -> &'static Regex {
        match self {
            TransactionCategory::Deposit => &DEPOSIT_RE,
            TransactionCategory::DebitCardPurchase => &CARD_PURCHASE_RE,
            TransactionCategory::OnlinePayment => &ONLINE_PAYMENT_RE,
            TransactionCategory::TransferOut => &TRANSFER_OUT_RE,
        }
    }
}

/// A money amount in whole cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn cents(self) -> i64 {
        self.0
    }
}

impl FromStr for Amount {
    type Err = TransactionError;

    /// Parses `1,234.56`, `$12.00` and `-$12.00`. Commas are ignored
    /// wherever they appear; exactly two fractional digits are required.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || TransactionError::InvalidAmount {
            raw: raw.to_string(),
        };

        let s = raw.trim();
        let (negative, s) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let s = s.strip_prefix('$').unwrap_or(s);
        let digits: String = s.chars().filter(|c| *c != ',').collect();

        let (whole, frac) = digits.split_once('.').ok_or_else(invalid)?;
        let all_digits = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(whole) || !all_digits(frac) || frac.len() != 2 {
            return Err(invalid());
        }

        let whole: i64 = whole.parse().map_err(|_| invalid())?;
        let frac: i64 = frac.parse().map_err(|_| invalid())?;
        let cents = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac))
            .ok_or_else(invalid)?;
        Ok(Amount(if negative { -cents } else { cents }))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub category: TransactionCategory,
    pub date: NaiveDate,
    /// Always non-negative; the direction comes from [`Transaction::kind`].
    pub amount: Amount,
}

impl Transaction {
    pub fn kind(&self) -> TransactionKind {
        self.category.kind()
    }
}

/// First and last day covered by a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementPeriod {
    pub begin: NaiveDate,
    pub end: NaiveDate,
}

impl StatementPeriod {
    /// Finds a "Month D, YYYY through Month D, YYYY" range in `text`.
    pub fn find(text: &str) -> Option<Self> {
        let caps = PERIOD_RE.captures(text)?;
        let begin = parse_long_date(&caps["begin"])?;
        let end = parse_long_date(&caps["end"])?;
        Some(Self { begin, end })
    }

    pub fn begin_year(&self) -> i32 {
        self.begin.year()
    }

    pub fn end_year(&self) -> i32 {
        self.end.year()
    }
}

fn parse_long_date(s: &str) -> Option<NaiveDate> {
    let normalized = WHITESPACE_RE.replace_all(s.trim(), " ");
    NaiveDate::parse_from_str(&normalized, "%B %d, %Y").ok()
}

/// How an `MM/DD` posting date gets its year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearContext {
    /// A date past the period end belongs to the period's first year, so a
    /// December posting on a December-January statement lands in December
    /// of the earlier year.
    Period(StatementPeriod),
    Year(i32),
}

impl YearContext {
    /// The local calendar year, for text with no statement period.
    pub fn current() -> Self {
        YearContext::Year(chrono::Local::now().year())
    }

    pub fn resolve(&self, month: u32, day: u32) -> Option<NaiveDate> {
        match self {
            YearContext::Year(year) => NaiveDate::from_ymd_opt(*year, month, day),
            YearContext::Period(period) => {
                let date = NaiveDate::from_ymd_opt(period.end_year(), month, day);
                match date {
                    Some(d) if d <= period.end || period.begin_year() == period.end_year() => {
                        Some(d)
                    }
                    _ => NaiveDate::from_ymd_opt(period.begin_year(), month, day),
                }
            }
        }
    }
}

/// Splits `text` into records, each starting at a line that begins with an
/// `MM/DD` date.
fn records(text: &str) -> Vec<&str> {
    let starts: Vec<usize> = RECORD_START.find_iter(text).map(|m| m.start()).collect();
    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(text.len());
            &text[start..end]
        })
        .collect()
}

fn parse_record(
    record: &str,
    category: TransactionCategory,
    years: &YearContext,
) -> Result<Option<Transaction>, TransactionError> {
    let Some(caps) = category.pattern().captures(record) else {
        return Ok(None);
    };

    let raw_date = &caps["date"];
    let invalid_date = || TransactionError::InvalidDate {
        date: raw_date.to_string(),
    };
    let (month, day) = raw_date.split_once('/').ok_or_else(invalid_date)?;
    let month: u32 = month.parse().map_err(|_| invalid_date())?;
    let day: u32 = day.parse().map_err(|_| invalid_date())?;
    let date = years.resolve(month, day).ok_or_else(invalid_date)?;

    let amount: Amount = caps["amount"].parse()?;
    Ok(Some(Transaction {
        category,
        date,
        amount,
    }))
}

/// Every record in `text` that matches `category`, regardless of whether
/// another category would also match it.
pub fn extract_transactions(
    text: &str,
    category: TransactionCategory,
    years: &YearContext,
) -> Result<Vec<Transaction>, TransactionError> {
    let mut out = Vec::new();
    for record in records(text) {
        if let Some(tx) = parse_record(record, category, years)? {
            out.push(tx);
        }
    }
    Ok(out)
}

/// Every recognised record in `text`, in text order, each classified once.
pub fn parse_transactions(
    text: &str,
    years: &YearContext,
) -> Result<Vec<Transaction>, TransactionError> {
    let mut out = Vec::new();
    for record in records(text) {
        for category in TransactionCategory::ALL {
            if let Some(tx) = parse_record(record, category, years)? {
                out.push(tx);
                break;
            }
        }
    }
    Ok(out)
}

/// Amount on the first "Beginning Balance" line.
pub fn beginning_balance(text: &str) -> Result<Option<Amount>, TransactionError> {
    balance(&BEGINNING_BALANCE_RE, text)
}

/// Amount on the first "Ending Balance" line.
pub fn ending_balance(text: &str) -> Result<Option<Amount>, TransactionError> {
    balance(&ENDING_BALANCE_RE, text)
}

fn balance(re: &Regex, text: &str) -> Result<Option<Amount>, TransactionError> {
    re.captures(text)
        .map(|caps| caps["amount"].parse())
        .transpose()
}

/// Everything recognised in one statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub period: Option<StatementPeriod>,
    pub beginning_balance: Option<Amount>,
    pub ending_balance: Option<Amount>,
    pub transactions: Vec<Transaction>,
}

impl Statement {
    /// Parse every page. Posting dates take their year from the statement
    /// period when one is printed, otherwise from `fallback`.
    pub fn parse(pages: &PageTexts, fallback: YearContext) -> Result<Self, TransactionError> {
        let period = pages.pages.iter().find_map(|p| StatementPeriod::find(p));
        let years = period.map(YearContext::Period).unwrap_or(fallback);

        let mut beginning = None;
        let mut ending = None;
        let mut transactions = Vec::new();
        for (index, page) in pages.pages.iter().enumerate() {
            if beginning.is_none() {
                beginning = beginning_balance(page)?;
            }
            if ending.is_none() {
                ending = ending_balance(page)?;
            }
            let found = parse_transactions(page, &years)?;
            tracing::debug!(page = index, transactions = found.len(), "parsed page transactions");
            transactions.extend(found);
        }

        tracing::info!(
            transactions = transactions.len(),
            has_period = period.is_some(),
            "parsed statement"
        );
        Ok(Self {
            period,
            beginning_balance: beginning,
            ending_balance: ending,
            transactions,
        })
    }

    /// Sum of all transactions of `kind`.
    pub fn total(&self, kind: TransactionKind) -> Amount {
        Amount(
            self.transactions
                .iter()
                .filter(|t| t.kind() == kind)
                .map(|t| t.amount.cents())
                .sum(),
        )
    }

    /// Credits minus debits.
    pub fn net_change(&self) -> Amount {
        Amount(self.total(TransactionKind::Credit).0 - self.total(TransactionKind::Debit).0)
    }
}
