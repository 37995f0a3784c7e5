use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use csv_mapper::core::{
    column::ColumnConfig,
    converter::{ConverterFlag, ConverterFlags, ValueTypeError},
    field::{CsvRecord, FieldDeclaration, FieldInfo, FieldType, FloatKind, IntegerKind},
    value::Value,
};

pub mod mocks;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Grade {
    #[default]
    Junior,
    Senior,
    Lead,
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Grade::Junior => "Junior",
            Grade::Senior => "Senior",
            Grade::Lead => "Lead",
        };
        f.write_str(name)
    }
}

impl FromStr for Grade {
    type Err = ValueTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Junior" => Ok(Grade::Junior),
            "Senior" => Ok(Grade::Senior),
            "Lead" => Ok(Grade::Lead),
            other => Err(ValueTypeError::new("grade", other)),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Employee {
    pub id: u32,
    pub name: String,
    pub salary: f64,
    pub hired: NaiveDate,
    pub active: bool,
    pub grade: Grade,
    pub manager: Option<String>,
}

impl CsvRecord for Employee {
    fn declarations() -> Vec<FieldDeclaration> {
        vec![
            FieldDeclaration::column(
                "id",
                FieldType::Integer(IntegerKind::U32),
                ColumnConfig::new().column_name("ID").must_not_be_blank(true),
            ),
            FieldDeclaration::column(
                "name",
                FieldType::String,
                ColumnConfig::new().trim_input(true).required(true),
            ),
            FieldDeclaration::column(
                "salary",
                FieldType::Float(FloatKind::F64),
                ColumnConfig::new().format("#,##0.00"),
            ),
            FieldDeclaration::column(
                "hired",
                FieldType::Date,
                ColumnConfig::new().format("%d/%m/%Y"),
            ),
            FieldDeclaration::column(
                "active",
                FieldType::Boolean,
                ColumnConfig::new().format("Y,N").default_value("Y"),
            ),
            FieldDeclaration::column(
                "grade",
                FieldType::enumeration(["Junior", "Senior", "Lead"]),
                ColumnConfig::new()
                    .converter_flags(ConverterFlags::new().with(ConverterFlag::CaseInsensitive)),
            ),
            FieldDeclaration::column(
                "manager",
                FieldType::String,
                ColumnConfig::new()
                    .optional_column(true)
                    .converter_flags(ConverterFlags::new().with(ConverterFlag::BlankIsNull)),
            ),
        ]
    }

    fn get_field(&self, field: &FieldInfo) -> Value {
        match field.name() {
            "id" => self.id.into(),
            "name" => self.name.as_str().into(),
            "salary" => self.salary.into(),
            "hired" => self.hired.into(),
            "active" => self.active.into(),
            "grade" => Value::variant(self.grade.to_string()),
            "manager" => self.manager.clone().into(),
            _ => Value::Null,
        }
    }

    fn set_field(&mut self, field: &FieldInfo, value: Value) -> Result<(), ValueTypeError> {
        match field.name() {
            "id" => self.id = value.try_into()?,
            "name" => self.name = value.try_into()?,
            "salary" => self.salary = value.try_into()?,
            "hired" => self.hired = value.try_into()?,
            "active" => self.active = value.try_into()?,
            "grade" => self.grade = String::try_from(value)?.parse()?,
            "manager" => self.manager = value.into_option()?,
            _ => {}
        }
        Ok(())
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn employees() -> Vec<Employee> {
    vec![
        Employee {
            id: 1,
            name: "Ada Lovelace".to_owned(),
            salary: 125000.5,
            hired: date(2019, 3, 1),
            active: true,
            grade: Grade::Lead,
            manager: None,
        },
        Employee {
            id: 2,
            name: "Grace \"Amazing\" Hopper".to_owned(),
            salary: 98000.0,
            hired: date(2021, 11, 15),
            active: false,
            grade: Grade::Senior,
            manager: Some("Ada Lovelace".to_owned()),
        },
        Employee {
            id: 3,
            name: "Linus, T.".to_owned(),
            salary: 610.25,
            hired: date(2024, 1, 2),
            active: true,
            grade: Grade::Junior,
            manager: Some("Grace Hopper".to_owned()),
        },
    ]
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
