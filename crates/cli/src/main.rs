use api_shared::{ClinicalDataRes, HealthService, PatientRes};
use clap::{Parser, Subcommand};
use sencare_core::{
    ClinicalDataInput, CoreConfig, FileStore, PatientInput, PatientService, RecordError,
    StoreBackend,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "sencare")]
#[command(about = "SenCare patient record system CLI")]
struct Cli {
    /// Patient data directory (defaults to $PATIENT_DATA_DIR, then "patient_data")
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the CLI is working
    Health,
    /// List all patients
    List,
    /// List patients whose condition is Critical
    Critical,
    /// Show one patient
    Show {
        /// Patient ID (24 hex characters)
        id: String,
    },
    /// Add a patient
    AddPatient {
        name: String,
        condition: String,
        contact: String,
        age: i64,
        /// Photo URI or path (optional)
        #[arg(long)]
        photo: Option<String>,
    },
    /// Replace a patient's name, condition, contact and age
    UpdatePatient {
        id: String,
        name: String,
        condition: String,
        contact: String,
        age: i64,
        #[arg(long)]
        photo: Option<String>,
    },
    /// Delete a patient and all its clinical data
    DeletePatient { id: String },
    /// Show a patient's clinical-data history
    ClinicalData { id: String },
    /// Append a clinical-data entry
    AddClinicalData {
        id: String,
        /// Observation date (YYYY-MM-DD or RFC 3339)
        date: String,
        /// Measurement kind, e.g. "Blood Pressure"
        #[arg(value_name = "TYPE")]
        kind: String,
        value: String,
        condition: String,
    },
    /// Update selected fields of a clinical-data entry
    UpdateClinicalData {
        id: String,
        entry_id: String,
        #[arg(long)]
        date: Option<String>,
        #[arg(long = "type", value_name = "TYPE")]
        kind: Option<String>,
        #[arg(long)]
        value: Option<String>,
        #[arg(long)]
        condition: Option<String>,
    },
    /// Delete a clinical-data entry
    DeleteClinicalData { id: String, entry_id: String },
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_patients(patients: Vec<sencare_core::Patient>) {
    if patients.is_empty() {
        println!("No patients found.");
        return;
    }
    for p in patients {
        println!(
            "ID: {}, Name: {}, Condition: {}, Age: {}, Entries: {}",
            p.id,
            p.name,
            p.condition,
            p.age,
            p.clinical_data.len()
        );
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let data_dir = cli
        .data_dir
        .or_else(|| std::env::var("PATIENT_DATA_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(sencare_core::DEFAULT_PATIENT_DATA_DIR));
    let cfg = Arc::new(CoreConfig::new(data_dir, StoreBackend::File, false)?);
    let store = Arc::new(FileStore::open(cfg.patients_dir())?);
    let service = PatientService::new(cfg, store);

    let result: Result<(), Box<dyn std::error::Error>> = match cli.command {
        Some(Commands::Health) => {
            println!("{}", HealthService::check_health().message);
            Ok(())
        }
        Some(Commands::List) => service.list_patients().map(print_patients).map_err(Into::into),
        Some(Commands::Critical) => service
            .list_critical_patients()
            .map(print_patients)
            .map_err(Into::into),
        Some(Commands::Show { id }) => service
            .get_patient(&id)
            .map_err(Into::into)
            .and_then(|p| print_json(&PatientRes::from(p))),
        Some(Commands::AddPatient {
            name,
            condition,
            contact,
            age,
            photo,
        }) => service
            .create_patient(PatientInput {
                name: Some(name),
                condition: Some(condition),
                contact: Some(contact),
                age: Some(age),
                photo,
                clinical_data: None,
            })
            .map(|p| println!("Added patient with ID: {}", p.id))
            .map_err(Into::into),
        Some(Commands::UpdatePatient {
            id,
            name,
            condition,
            contact,
            age,
            photo,
        }) => service
            .update_patient(
                &id,
                PatientInput {
                    name: Some(name),
                    condition: Some(condition),
                    contact: Some(contact),
                    age: Some(age),
                    photo,
                    clinical_data: None,
                },
            )
            .map_err(Into::into)
            .and_then(|p| print_json(&PatientRes::from(p))),
        Some(Commands::DeletePatient { id }) => service
            .delete_patient(&id)
            .map(|p| println!("Deleted patient {}", p.id))
            .map_err(Into::into),
        Some(Commands::ClinicalData { id }) => service
            .clinical_data(&id)
            .map_err(Into::into)
            .and_then(|entries| {
                let entries: Vec<ClinicalDataRes> = entries.into_iter().map(Into::into).collect();
                print_json(&entries)
            }),
        Some(Commands::AddClinicalData {
            id,
            date,
            kind,
            value,
            condition,
        }) => service
            .add_clinical_data(
                &id,
                ClinicalDataInput {
                    date: Some(date),
                    kind: Some(kind),
                    value: Some(value),
                    condition: Some(condition),
                },
            )
            .map(|e| println!("Added clinical data with ID: {}", e.id))
            .map_err(Into::into),
        Some(Commands::UpdateClinicalData {
            id,
            entry_id,
            date,
            kind,
            value,
            condition,
        }) => service
            .update_clinical_data(
                &id,
                &entry_id,
                ClinicalDataInput {
                    date,
                    kind,
                    value,
                    condition,
                },
            )
            .map_err(Into::into)
            .and_then(|e| print_json(&ClinicalDataRes::from(e))),
        Some(Commands::DeleteClinicalData { id, entry_id }) => service
            .delete_clinical_data(&id, &entry_id)
            .map(|e| println!("Deleted clinical data {}", e.id))
            .map_err(Into::into),
        None => {
            println!("Use 'sencare --help' for commands");
            Ok(())
        }
    };

    match result {
        Err(e) => match e.downcast_ref::<RecordError>() {
            Some(err) if err.is_client_error() => {
                eprintln!("Error: {}", err);
                std::process::exit(2);
            }
            _ => Err(e),
        },
        ok => ok,
    }
}
