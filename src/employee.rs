//! Employee directory
//!
//! Built once from records supplied by the caller and never mutated
//! afterwards; share it behind an `Arc` across requests.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Canonical employee record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// National identity number (DNI), digits only
    pub identity_number: String,
    /// Payroll code (legajo); may be empty
    pub employee_code: String,
    pub surname: String,
    pub given_names: String,
    pub sector: String,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.surname, self.given_names).trim().to_string()
    }
}

/// Immutable lookup by identity number or employee code
#[derive(Debug, Default)]
pub struct EmployeeDirectory {
    employees: Vec<Employee>,
    by_identity: HashMap<String, usize>,
    by_code: HashMap<String, usize>,
}

impl EmployeeDirectory {
    /// Index records; on duplicate keys the later record wins
    pub fn new(records: impl IntoIterator<Item = Employee>) -> Self {
        let mut directory = Self::default();

        for mut employee in records {
            employee.identity_number = digits(&employee.identity_number);
            employee.employee_code = employee.employee_code.trim().to_string();

            let index = directory.employees.len();
            if !employee.identity_number.is_empty() {
                directory
                    .by_identity
                    .insert(employee.identity_number.clone(), index);
            }
            if !employee.employee_code.is_empty() {
                directory.by_code.insert(employee.employee_code.clone(), index);
            }
            directory.employees.push(employee);
        }

        tracing::debug!(
            employees = directory.employees.len(),
            "Employee directory indexed"
        );
        directory
    }

    /// Resolve what an employee typed to identify themselves
    ///
    /// Tries the digits as an identity number, then the code as typed, then
    /// the code with spaces removed.
    pub fn lookup(&self, token: &str) -> Option<&Employee> {
        let token = token.trim();
        let only_digits = digits(token);

        let index = (!only_digits.is_empty())
            .then(|| self.by_identity.get(&only_digits))
            .flatten()
            .or_else(|| self.by_code.get(token))
            .or_else(|| self.by_code.get(&token.replace(' ', "")))?;

        self.employees.get(*index)
    }

    pub fn by_identity_number(&self, identity_number: &str) -> Option<&Employee> {
        self.by_identity
            .get(&digits(identity_number))
            .and_then(|index| self.employees.get(*index))
    }

    pub fn len(&self) -> usize {
        self.employees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }
}

fn digits(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

#[cfg(test)]
pub(crate) fn employee(identity: &str, code: &str, surname: &str) -> Employee {
    Employee {
        identity_number: identity.to_string(),
        employee_code: code.to_string(),
        surname: surname.to_string(),
        given_names: "Ana".to_string(),
        sector: "Planta".to_string(),
    }
}
