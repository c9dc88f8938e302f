//! Whole-profile snapshots and the built-in demo profile.

use chrono::NaiveDate;
use folio_core::{AboutContent, ContactInfo, Experience, ProfileLink, Project, Skill};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Every profile record, as loaded into a store in one go.
///
/// Serializable so `folio seed --from profile.json` can load a real profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileData {
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub experiences: Vec<Experience>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub about: Option<AboutContent>,
    #[serde(default)]
    pub contact: Option<ContactInfo>,
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn techs(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn skill(id: i64, name: &str, category: &str, proficiency: u8, active: bool) -> Skill {
    Skill {
        id,
        name: name.into(),
        category: category.into(),
        proficiency,
        display_order: id as i32,
        active,
    }
}

/// A small but complete SRE profile used by `store.backend = "memory"`,
/// `folio seed`, and tests.
///
/// Includes one inactive record per list and a non-featured project so the
/// filtering rules are visible.
pub fn demo_profile() -> ProfileData {
    let skills = vec![
        skill(1, "Kubernetes", "Infrastructure", 5, true),
        skill(2, "Terraform", "Infrastructure", 5, true),
        skill(3, "Prometheus", "Observability", 4, true),
        skill(4, "Python", "Languages", 4, true),
        skill(5, "Go", "Languages", 4, true),
        skill(6, "Rust", "Languages", 3, true),
        skill(7, "AWS", "Cloud", 4, true),
        skill(8, "Docker", "Infrastructure", 5, true),
        skill(9, "Jenkins", "CI/CD", 2, false),
    ];

    let experiences = vec![
        Experience {
            id: 1,
            title: "Senior Site Reliability Engineer".into(),
            company: "Northwind Cloud".into(),
            start_date: date(2021, 3, 1),
            end_date: None,
            current: true,
            description: "Runs the multi-region Kubernetes platform and owns the SLO program."
                .into(),
            technologies: techs(&["Go", "Kubernetes", "Prometheus", "Terraform"]),
            display_order: 1,
            active: true,
        },
        Experience {
            id: 2,
            title: "DevOps Engineer".into(),
            company: "Contoso Logistics".into(),
            start_date: date(2018, 6, 1),
            end_date: Some(date(2021, 2, 28)),
            current: false,
            description: "Moved a monolith from VMs to containers on AWS and built the CI pipelines."
                .into(),
            technologies: techs(&["AWS", "Ansible", "Docker", "Python"]),
            display_order: 2,
            active: true,
        },
        Experience {
            id: 3,
            title: "Systems Administrator".into(),
            company: "Fabrikam Hosting".into(),
            start_date: date(2015, 1, 5),
            end_date: Some(date(2018, 5, 31)),
            current: false,
            description: "Operated a fleet of Linux web servers and the on-call rotation.".into(),
            technologies: techs(&["Bash", "Linux", "Nagios"]),
            display_order: 3,
            active: true,
        },
        Experience {
            id: 4,
            title: "IT Intern".into(),
            company: "Fabrikam Hosting".into(),
            start_date: date(2014, 6, 1),
            end_date: Some(date(2014, 9, 30)),
            current: false,
            description: "Summer internship.".into(),
            technologies: BTreeSet::new(),
            display_order: 4,
            active: false,
        },
    ];

    let projects = vec![
        Project {
            id: 1,
            title: "Homelab Platform".into(),
            description: "GitOps-managed three node cluster hosting personal services.".into(),
            project_type: "homelab".into(),
            links: vec![ProfileLink::new("GitHub", "https://github.com/bruno-homelab/platform")],
            technologies: techs(&["ArgoCD", "Kubernetes", "Proxmox"]),
            featured: true,
            active: true,
            display_order: 1,
        },
        Project {
            id: 2,
            title: "SLO Burn Dashboard".into(),
            description: "Multi-window burn-rate alerts and Grafana dashboards as code.".into(),
            project_type: "open-source".into(),
            links: vec![ProfileLink::new("GitHub", "https://github.com/bruno-homelab/slo-burn")],
            technologies: techs(&["Grafana", "Jsonnet", "Prometheus"]),
            featured: true,
            active: true,
            display_order: 2,
        },
        Project {
            id: 3,
            title: "Terraform AWS Modules".into(),
            description: "Opinionated modules for VPCs, EKS clusters and IAM baselines.".into(),
            project_type: "open-source".into(),
            links: Vec::new(),
            technologies: techs(&["AWS", "Terraform"]),
            featured: true,
            active: true,
            display_order: 3,
        },
        Project {
            id: 4,
            title: "Chaos Experiments".into(),
            description: "Pod and network fault injection runbooks.".into(),
            project_type: "open-source".into(),
            links: Vec::new(),
            technologies: techs(&["Kubernetes", "Litmus"]),
            featured: false,
            active: true,
            display_order: 4,
        },
        Project {
            id: 5,
            title: "Legacy Nagios Plugins".into(),
            description: "Retired check scripts.".into(),
            project_type: "open-source".into(),
            links: Vec::new(),
            technologies: techs(&["Perl"]),
            featured: true,
            active: false,
            display_order: 5,
        },
    ];

    ProfileData {
        skills,
        experiences,
        projects,
        about: Some(AboutContent {
            headline: Some("Site Reliability Engineer".into()),
            description: "Bruno is an SRE with ten years of operations experience who likes \
                          boring, well-observed infrastructure."
                .into(),
        }),
        contact: Some(ContactInfo {
            email: "bruno@example.com".into(),
            location: "Lisbon, Portugal".into(),
            links: vec![
                ProfileLink::new("LinkedIn", "https://www.linkedin.com/in/bruno-sre"),
                ProfileLink::new("GitHub", "https://github.com/bruno-homelab"),
            ],
            availability: "Open to senior SRE and platform engineering roles".into(),
        }),
    }
}
