use bizdesk_core::crm::{
    Customer, CustomerPreferences, CustomerPriority, CustomerStatus, CustomerType, PaymentMethod,
};
use bizdesk_core::filter::{Page, RecordFilter, option_matches, paginate, search_matches};
use bizdesk_core::models::{Address, non_blank, split_list};
use bizdesk_core::{DeskError, FormErrors, Result, to_csv};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerDraft {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub legal_name: Option<String>,
    #[serde(default)]
    pub customer_type: CustomerType,
    #[serde(default)]
    pub status: CustomerStatus,
    #[serde(default)]
    pub priority: CustomerPriority,
    #[serde(default)]
    pub tax_id: Option<String>,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    pub address: Address,
    #[serde(default = "default_true")]
    pub billing_same_as_main: bool,
    /// Only read when `billing_same_as_main` is off.
    #[serde(default)]
    pub billing_address: Option<Address>,
    #[serde(default)]
    pub credit_limit: Decimal,
    #[serde(default)]
    pub discount_percentage: Decimal,
    #[serde(default)]
    pub preferences: CustomerPreferences,
    #[serde(default)]
    pub notes: Option<String>,
    /// Comma separated.
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub sales_representative: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
}

fn default_true() -> bool {
    true
}

impl CustomerDraft {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FormErrors::new();
        errors.min_len("code", &self.code, 3);
        errors.min_len("name", &self.name, 2);
        errors.email("email", &self.email);
        errors.required("phone", &self.phone);
        errors.optional_email("contact_email", self.contact_email.as_deref().unwrap_or_default());
        self.address.validate_into("address", &mut errors);
        if !self.billing_same_as_main {
            match &self.billing_address {
                Some(billing) => billing.validate_into("billing_address", &mut errors),
                None => errors.push("billing_address", "is required"),
            }
        }
        errors.amount("credit_limit", self.credit_limit, Decimal::ZERO);
        errors.range_decimal(
            "discount_percentage",
            self.discount_percentage,
            Decimal::ZERO,
            Decimal::ONE_HUNDRED,
        );
        errors.into_result()
    }

    fn resolved_billing(&self) -> Address {
        match (&self.billing_address, self.billing_same_as_main) {
            (Some(billing), false) => billing.clone(),
            _ => self.address.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<CustomerStatus>,
    #[serde(default)]
    pub customer_type: Option<CustomerType>,
    #[serde(default)]
    pub priority: Option<CustomerPriority>,
}

impl RecordFilter<Customer> for CustomerFilter {
    fn matches(&self, customer: &Customer) -> bool {
        search_matches(
            self.search.as_deref(),
            &[
                customer.name.as_str(),
                customer.code.as_str(),
                customer.email.as_str(),
            ],
        ) && option_matches(self.status.as_ref(), &customer.status)
            && option_matches(self.customer_type.as_ref(), &customer.customer_type)
            && option_matches(self.priority.as_ref(), &customer.priority)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerStats {
    pub total_customers: usize,
    pub active_customers: usize,
    pub business_customers: usize,
    pub total_credit_limit: Decimal,
    pub total_balance: Decimal,
}

#[derive(Debug, Default)]
pub struct CustomerBook {
    customers: Vec<Customer>,
}

impl CustomerBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> &[Customer] {
        &self.customers
    }

    pub fn get(&self, id: Uuid) -> Option<&Customer> {
        self.customers.iter().find(|customer| customer.id == id)
    }

    /// Suggested code for the next customer: `CLI` plus the count, padded.
    pub fn next_code(&self) -> String {
        format!("CLI{:03}", self.customers.len() + 1)
    }

    /// New customers start with no balance or purchase history and are listed
    /// first.
    pub fn create(&mut self, draft: CustomerDraft) -> Result<Customer> {
        draft.validate()?;
        let code = draft.code.trim().to_string();
        self.ensure_code_free(&code, None)?;

        let now = Utc::now();
        let mut customer = Customer {
            id: Uuid::new_v4(),
            code: String::new(),
            name: String::new(),
            legal_name: None,
            customer_type: draft.customer_type,
            status: draft.status,
            priority: draft.priority,
            tax_id: None,
            email: String::new(),
            phone: String::new(),
            website: None,
            contact_person: None,
            contact_email: None,
            contact_phone: None,
            address: Address::default(),
            billing_address: None,
            payment_methods: vec![PaymentMethod::CreditCard],
            credit_limit: Decimal::ZERO,
            current_balance: Decimal::ZERO,
            total_purchases: Decimal::ZERO,
            last_purchase_date: None,
            registration_date: now,
            birth_date: None,
            notes: None,
            tags: Vec::new(),
            sales_representative: None,
            discount_percentage: Decimal::ZERO,
            is_active: false,
            preferences: CustomerPreferences::default(),
            loyalty_points: 0,
            created_at: now,
            updated_at: now,
        };
        apply_draft(&mut customer, code, draft);
        self.customers.insert(0, customer.clone());
        Ok(customer)
    }

    /// Balances, purchase history, loyalty points and payment methods are kept.
    pub fn update(&mut self, id: Uuid, draft: CustomerDraft) -> Result<Customer> {
        draft.validate()?;
        let code = draft.code.trim().to_string();
        self.ensure_code_free(&code, Some(id))?;

        let customer = self
            .customers
            .iter_mut()
            .find(|customer| customer.id == id)
            .ok_or_else(|| DeskError::not_found("customer", id))?;
        apply_draft(customer, code, draft);
        customer.updated_at = Utc::now();
        Ok(customer.clone())
    }

    pub fn delete(&mut self, id: Uuid) -> Result<Customer> {
        let index = self
            .customers
            .iter()
            .position(|customer| customer.id == id)
            .ok_or_else(|| DeskError::not_found("customer", id))?;
        Ok(self.customers.remove(index))
    }

    pub fn filter(&self, filter: &CustomerFilter) -> Vec<&Customer> {
        filter.apply(&self.customers)
    }

    pub fn page(&self, filter: &CustomerFilter, page: usize, per_page: usize) -> Page<Customer> {
        let matching: Vec<Customer> = self.filter(filter).into_iter().cloned().collect();
        paginate(&matching, page, per_page)
    }

    pub fn stats(&self) -> CustomerStats {
        CustomerStats {
            total_customers: self.customers.len(),
            active_customers: self
                .customers
                .iter()
                .filter(|customer| customer.status == CustomerStatus::Active)
                .count(),
            business_customers: self
                .customers
                .iter()
                .filter(|customer| customer.customer_type == CustomerType::Business)
                .count(),
            total_credit_limit: self.customers.iter().map(|customer| customer.credit_limit).sum(),
            total_balance: self
                .customers
                .iter()
                .map(|customer| customer.current_balance)
                .sum(),
        }
    }

    pub fn export_csv(&self, filter: &CustomerFilter) -> Result<String> {
        to_csv(self.filter(filter))
    }

    fn ensure_code_free(&self, code: &str, except: Option<Uuid>) -> Result<()> {
        if self
            .customers
            .iter()
            .any(|customer| customer.code == code && Some(customer.id) != except)
        {
            return Err(DeskError::DuplicateCode {
                entity: "customer",
                code: code.to_string(),
            });
        }
        Ok(())
    }
}

fn apply_draft(customer: &mut Customer, code: String, draft: CustomerDraft) {
    customer.billing_address = Some(draft.resolved_billing());
    customer.code = code;
    customer.name = draft.name.trim().to_string();
    customer.legal_name = non_blank(draft.legal_name.as_deref());
    customer.customer_type = draft.customer_type;
    customer.status = draft.status;
    customer.is_active = draft.status == CustomerStatus::Active;
    customer.priority = draft.priority;
    customer.tax_id = non_blank(draft.tax_id.as_deref());
    customer.email = draft.email.trim().to_string();
    customer.phone = draft.phone.trim().to_string();
    customer.website = non_blank(draft.website.as_deref());
    customer.contact_person = non_blank(draft.contact_person.as_deref());
    customer.contact_email = non_blank(draft.contact_email.as_deref());
    customer.contact_phone = non_blank(draft.contact_phone.as_deref());
    customer.address = draft.address;
    customer.credit_limit = draft.credit_limit;
    customer.discount_percentage = draft.discount_percentage;
    customer.preferences = draft.preferences;
    customer.notes = non_blank(draft.notes.as_deref());
    customer.tags = split_list(&draft.tags);
    customer.sales_representative = non_blank(draft.sales_representative.as_deref());
    customer.birth_date = draft.birth_date;
}
