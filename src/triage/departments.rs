use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DepartmentContact {
    pub phone: &'static str,
    pub email: &'static str,
}

/// Department routing directory. Classification output is validated against
/// these names; anything else the model invents is dropped.
pub const DEPARTMENT_DIRECTORY: &[(&str, DepartmentContact)] = &[
    (
        "Electricity Board",
        DepartmentContact {
            phone: "1800-112-233",
            email: "power@civic.gov.in",
        },
    ),
    (
        "Department of Water Resources",
        DepartmentContact {
            phone: "1800-221-445",
            email: "water@civic.gov.in",
        },
    ),
    (
        "Road Development",
        DepartmentContact {
            phone: "1800-443-556",
            email: "roads@civic.gov.in",
        },
    ),
    (
        "Health Ministry",
        DepartmentContact {
            phone: "1800-777-999",
            email: "health@civic.gov.in",
        },
    ),
    (
        "Sanitation",
        DepartmentContact {
            phone: "1800-333-122",
            email: "cleanliness@civic.gov.in",
        },
    ),
];

/// Route used when classification fails or returns nothing usable.
pub const DEFAULT_DEPARTMENT: &str = "Road Development";

pub fn department_names() -> Vec<&'static str> {
    DEPARTMENT_DIRECTORY.iter().map(|(name, _)| *name).collect()
}

pub fn is_known_department(name: &str) -> bool {
    DEPARTMENT_DIRECTORY.iter().any(|(known, _)| *known == name)
}

pub fn contact_for(name: &str) -> Option<DepartmentContact> {
    DEPARTMENT_DIRECTORY
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, contact)| *contact)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_has_five_departments_in_routing_order() {
        let names = department_names();
        assert_eq!(
            names,
            vec![
                "Electricity Board",
                "Department of Water Resources",
                "Road Development",
                "Health Ministry",
                "Sanitation"
            ]
        );
    }

    #[test]
    fn lookup_is_exact_match_only() {
        assert!(is_known_department("Sanitation"));
        assert!(!is_known_department("sanitation"));
        assert!(!is_known_department("Sanitation Dept"));
    }

    #[test]
    fn contacts_resolve() {
        let contact = contact_for("Health Ministry").unwrap();
        assert_eq!(contact.phone, "1800-777-999");
        assert_eq!(contact.email, "health@civic.gov.in");
        assert!(contact_for("Unknown").is_none());
    }

    #[test]
    fn default_department_is_in_directory() {
        assert!(is_known_department(DEFAULT_DEPARTMENT));
    }
}
