//! EPF/ETF payroll arithmetic.

use serde::{Deserialize, Serialize};

use crate::record::PayrollRow;
use crate::stats::Measure;

/// Statutory contribution rates, as fractions of basic salary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PayrollRates {
    /// EPF withheld from the employee.
    pub epf_employee: f64,
    /// EPF paid on top by the employer.
    pub epf_employer: f64,
    /// ETF paid by the employer.
    pub etf: f64,
}

impl Default for PayrollRates {
    fn default() -> Self {
        Self {
            epf_employee: 0.08,
            epf_employer: 0.12,
            etf: 0.03,
        }
    }
}

/// Figures for one payroll row, each rounded to cents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PayrollBreakdown {
    pub gross: f64,
    pub epf_employee: f64,
    pub epf_employer: f64,
    pub etf: f64,
    pub net: f64,
    /// What the clinic pays out in total: gross plus employer contributions.
    pub employer_cost: f64,
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl PayrollRow {
    pub fn gross(&self) -> f64 {
        self.basic_salary + self.allowances + self.overtime
    }

    pub fn breakdown(&self, rates: &PayrollRates) -> PayrollBreakdown {
        let gross = round_cents(self.gross());
        let epf_employee = round_cents(self.basic_salary * rates.epf_employee);
        let epf_employer = round_cents(self.basic_salary * rates.epf_employer);
        let etf = round_cents(self.basic_salary * rates.etf);
        let net = round_cents(gross - epf_employee - self.deductions);

        PayrollBreakdown {
            gross,
            epf_employee,
            epf_employer,
            etf,
            net,
            employer_cost: round_cents(gross + epf_employer + etf),
        }
    }

    pub fn net_salary(&self, rates: &PayrollRates) -> f64 {
        self.breakdown(rates).net
    }
}

/// Net salary averaged per employee rather than per row.
pub fn net_salary_measure(rates: PayrollRates) -> Measure<'static, PayrollRow> {
    Measure::per_entity(
        move |row: &PayrollRow| Some(row.net_salary(&rates)),
        |row: &PayrollRow| row.employee_id.clone(),
    )
}
