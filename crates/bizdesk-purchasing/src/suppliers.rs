use bizdesk_core::filter::{RecordFilter, option_matches, search_matches};
use bizdesk_core::models::{Address, non_blank, split_list};
use bizdesk_core::purchasing::{
    PaymentTerms, Supplier, SupplierBankAccount, SupplierStatus, SupplierType,
};
use bizdesk_core::{DeskError, FormErrors, Result, to_csv};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierDraft {
    pub code: String,
    pub name: String,
    pub legal_name: String,
    pub supplier_type: SupplierType,
    #[serde(default = "default_status")]
    pub status: SupplierStatus,
    pub tax_id: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub website: Option<String>,
    pub contact_person: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub address: Address,
    #[serde(default)]
    pub payment_terms: PaymentTerms,
    #[serde(default)]
    pub credit_limit: Decimal,
    #[serde(default = "default_rating")]
    pub rating: u8,
    #[serde(default)]
    pub notes: Option<String>,
    /// Comma separated.
    #[serde(default)]
    pub categories: String,
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default)]
    pub routing_number: Option<String>,
}

fn default_status() -> SupplierStatus {
    SupplierStatus::Active
}

fn default_rating() -> u8 {
    5
}

impl SupplierDraft {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FormErrors::new();
        errors.min_len("code", &self.code, 3);
        errors.min_len("name", &self.name, 2);
        errors.required("legal_name", &self.legal_name);
        errors.required("tax_id", &self.tax_id);
        errors.email("email", &self.email);
        errors.required("phone", &self.phone);
        errors.required("contact_person", &self.contact_person);
        errors.email("contact_email", &self.contact_email);
        errors.required("contact_phone", &self.contact_phone);
        self.address.validate_into("address", &mut errors);
        errors.amount("credit_limit", self.credit_limit, Decimal::ZERO);
        errors.range_u8("rating", self.rating, 1, 5);
        errors.into_result()
    }

    fn bank_account(&self) -> Option<SupplierBankAccount> {
        non_blank(self.bank_name.as_deref()).map(|bank_name| SupplierBankAccount {
            bank_name,
            account_number: non_blank(self.account_number.as_deref()).unwrap_or_default(),
            routing_number: non_blank(self.routing_number.as_deref()).unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupplierFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<SupplierStatus>,
    #[serde(default)]
    pub supplier_type: Option<SupplierType>,
}

impl RecordFilter<Supplier> for SupplierFilter {
    fn matches(&self, supplier: &Supplier) -> bool {
        search_matches(
            self.search.as_deref(),
            &[
                supplier.name.as_str(),
                supplier.code.as_str(),
                supplier.contact_person.as_str(),
            ],
        ) && option_matches(self.status.as_ref(), &supplier.status)
            && option_matches(self.supplier_type.as_ref(), &supplier.supplier_type)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierStats {
    pub total_suppliers: usize,
    pub active_suppliers: usize,
    pub total_balance: Decimal,
    pub average_rating: Decimal,
}

#[derive(Debug, Default)]
pub struct SupplierDirectory {
    suppliers: Vec<Supplier>,
}

impl SupplierDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> &[Supplier] {
        &self.suppliers
    }

    pub fn get(&self, id: Uuid) -> Option<&Supplier> {
        self.suppliers.iter().find(|supplier| supplier.id == id)
    }

    pub fn create(&mut self, draft: SupplierDraft) -> Result<Supplier> {
        draft.validate()?;
        let code = draft.code.trim().to_string();
        self.ensure_code_free(&code, None)?;

        let now = Utc::now();
        let mut supplier = Supplier {
            id: Uuid::new_v4(),
            code: String::new(),
            name: String::new(),
            legal_name: String::new(),
            supplier_type: draft.supplier_type,
            status: draft.status,
            tax_id: String::new(),
            email: String::new(),
            phone: String::new(),
            website: None,
            contact_person: String::new(),
            contact_email: String::new(),
            contact_phone: String::new(),
            address: Address::default(),
            payment_terms: draft.payment_terms,
            credit_limit: Decimal::ZERO,
            current_balance: Decimal::ZERO,
            rating: draft.rating,
            notes: None,
            categories: Vec::new(),
            bank_account: None,
            is_active: false,
            created_at: now,
            updated_at: now,
        };
        apply_draft(&mut supplier, code, draft);
        self.suppliers.push(supplier.clone());
        Ok(supplier)
    }

    /// Balance and creation stamp are kept.
    pub fn update(&mut self, id: Uuid, draft: SupplierDraft) -> Result<Supplier> {
        draft.validate()?;
        let code = draft.code.trim().to_string();
        self.ensure_code_free(&code, Some(id))?;

        let supplier = self.get_mut(id)?;
        apply_draft(supplier, code, draft);
        supplier.updated_at = Utc::now();
        Ok(supplier.clone())
    }

    pub fn delete(&mut self, id: Uuid) -> Result<Supplier> {
        let index = self
            .suppliers
            .iter()
            .position(|supplier| supplier.id == id)
            .ok_or_else(|| DeskError::not_found("supplier", id))?;
        Ok(self.suppliers.remove(index))
    }

    /// Active suppliers become inactive; any other status becomes active.
    pub fn toggle_status(&mut self, id: Uuid) -> Result<Supplier> {
        let supplier = self.get_mut(id)?;
        supplier.status = match supplier.status {
            SupplierStatus::Active => SupplierStatus::Inactive,
            SupplierStatus::Inactive | SupplierStatus::Blocked => SupplierStatus::Active,
        };
        supplier.is_active = supplier.status == SupplierStatus::Active;
        supplier.updated_at = Utc::now();
        Ok(supplier.clone())
    }

    pub fn filter(&self, filter: &SupplierFilter) -> Vec<&Supplier> {
        filter.apply(&self.suppliers)
    }

    pub fn stats(&self) -> SupplierStats {
        let total_suppliers = self.suppliers.len();
        let rating_sum: Decimal = self
            .suppliers
            .iter()
            .map(|supplier| Decimal::from(supplier.rating))
            .sum();
        let average_rating = if total_suppliers == 0 {
            Decimal::ZERO
        } else {
            rating_sum / Decimal::from(total_suppliers)
        };

        SupplierStats {
            total_suppliers,
            active_suppliers: self
                .suppliers
                .iter()
                .filter(|supplier| supplier.status == SupplierStatus::Active)
                .count(),
            total_balance: self
                .suppliers
                .iter()
                .map(|supplier| supplier.current_balance)
                .sum(),
            average_rating,
        }
    }

    pub fn export_csv(&self, filter: &SupplierFilter) -> Result<String> {
        to_csv(self.filter(filter))
    }

    fn get_mut(&mut self, id: Uuid) -> Result<&mut Supplier> {
        self.suppliers
            .iter_mut()
            .find(|supplier| supplier.id == id)
            .ok_or_else(|| DeskError::not_found("supplier", id))
    }

    fn ensure_code_free(&self, code: &str, except: Option<Uuid>) -> Result<()> {
        if self
            .suppliers
            .iter()
            .any(|supplier| supplier.code == code && Some(supplier.id) != except)
        {
            return Err(DeskError::DuplicateCode {
                entity: "supplier",
                code: code.to_string(),
            });
        }
        Ok(())
    }
}

fn apply_draft(supplier: &mut Supplier, code: String, draft: SupplierDraft) {
    supplier.bank_account = draft.bank_account();
    supplier.code = code;
    supplier.name = draft.name.trim().to_string();
    supplier.legal_name = draft.legal_name.trim().to_string();
    supplier.supplier_type = draft.supplier_type;
    supplier.status = draft.status;
    supplier.is_active = draft.status == SupplierStatus::Active;
    supplier.tax_id = draft.tax_id.trim().to_string();
    supplier.email = draft.email.trim().to_string();
    supplier.phone = draft.phone.trim().to_string();
    supplier.website = non_blank(draft.website.as_deref());
    supplier.contact_person = draft.contact_person.trim().to_string();
    supplier.contact_email = draft.contact_email.trim().to_string();
    supplier.contact_phone = draft.contact_phone.trim().to_string();
    supplier.address = draft.address;
    supplier.payment_terms = draft.payment_terms;
    supplier.credit_limit = draft.credit_limit;
    supplier.rating = draft.rating;
    supplier.notes = non_blank(draft.notes.as_deref());
    supplier.categories = split_list(&draft.categories);
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn draft(code: &str) -> SupplierDraft {
        SupplierDraft {
            code: code.to_string(),
            name: "TechnoSupply S.L.".into(),
            legal_name: "TechnoSupply Sociedad Limitada".into(),
            supplier_type: SupplierType::Goods,
            status: SupplierStatus::Active,
            tax_id: "B12345678".into(),
            email: "ventas@technosupply.es".into(),
            phone: "+34 91 123 4567".into(),
            website: None,
            contact_person: "Ana García".into(),
            contact_email: "ana.garcia@technosupply.es".into(),
            contact_phone: "+34 600 123 456".into(),
            address: Address {
                street: "Calle Tecnología 123".into(),
                city: "Madrid".into(),
                state: "Madrid".into(),
                postal_code: "28001".into(),
                country: "España".into(),
            },
            payment_terms: PaymentTerms::Net30,
            credit_limit: Decimal::from(50_000),
            rating: 4,
            notes: None,
            categories: "Electrónicos, Informática, ".into(),
            bank_name: Some("Banco Santander".into()),
            account_number: Some("ES91 2100 0418 4502 0005 1332".into()),
            routing_number: None,
        }
    }

    #[test]
    fn create_derives_flags_lists_and_bank() {
        let mut directory = SupplierDirectory::new();
        let supplier = directory.create(draft("PROV001")).unwrap();
        assert!(supplier.is_active);
        assert_eq!(supplier.categories, vec!["Electrónicos", "Informática"]);
        let bank = supplier.bank_account.unwrap();
        assert_eq!(bank.bank_name, "Banco Santander");
        assert_eq!(bank.routing_number, "");

        let mut no_bank = draft("PROV002");
        no_bank.bank_name = Some(" ".into());
        assert!(directory.create(no_bank).unwrap().bank_account.is_none());
    }

    #[test]
    fn validation_covers_contact_address_and_rating() {
        let mut directory = SupplierDirectory::new();
        let mut bad = draft("PR");
        bad.contact_email = "ana".into();
        bad.address.city = String::new();
        bad.rating = 6;
        let Err(DeskError::Validation(errors)) = directory.create(bad) else {
            panic!("expected validation errors");
        };
        assert!(errors.has("code"));
        assert!(errors.has("contact_email"));
        assert!(errors.has("address.city"));
        assert!(errors.has("rating"));
    }

    #[test]
    fn duplicate_code_is_rejected() {
        let mut directory = SupplierDirectory::new();
        directory.create(draft("PROV001")).unwrap();
        assert!(matches!(
            directory.create(draft("PROV001")),
            Err(DeskError::DuplicateCode { .. })
        ));
    }

    #[test]
    fn toggle_flips_status_and_flag() {
        let mut directory = SupplierDirectory::new();
        let supplier = directory.create(draft("PROV001")).unwrap();
        let toggled = directory.toggle_status(supplier.id).unwrap();
        assert_eq!(toggled.status, SupplierStatus::Inactive);
        assert!(!toggled.is_active);
        assert!(directory.toggle_status(supplier.id).unwrap().is_active);
    }

    #[test]
    fn stats_handle_empty_and_average() {
        let mut directory = SupplierDirectory::new();
        assert_eq!(directory.stats().average_rating, Decimal::ZERO);

        directory.create(draft("PROV001")).unwrap();
        let mut second = draft("PROV002");
        second.rating = 5;
        second.status = SupplierStatus::Blocked;
        directory.create(second).unwrap();

        let stats = directory.stats();
        assert_eq!(stats.total_suppliers, 2);
        assert_eq!(stats.active_suppliers, 1);
        assert_eq!(stats.average_rating, Decimal::new(45, 1));
    }

    #[test]
    fn filter_and_export() {
        let mut directory = SupplierDirectory::new();
        directory.create(draft("PROV001")).unwrap();
        let mut services = draft("SERV001");
        services.name = "CleanPro Servicios".into();
        services.contact_person = "Luis Pérez".into();
        services.supplier_type = SupplierType::Services;
        directory.create(services).unwrap();

        let by_contact = SupplierFilter {
            search: Some("pérez".into()),
            ..SupplierFilter::default()
        };
        assert_eq!(directory.filter(&by_contact).len(), 1);

        let goods = SupplierFilter {
            supplier_type: Some(SupplierType::Goods),
            ..SupplierFilter::default()
        };
        let csv = directory.export_csv(&goods).unwrap();
        assert_eq!(csv.lines().count(), 2);
        assert!(csv.contains("\"PROV001\""));
        assert!(!csv.contains("SERV001"));
    }
}
