//! Terraform scaffold for a priced bundle

use regex::Regex;
use std::fmt::Write;
use std::sync::LazyLock;

use crate::models::ServiceDetail;

pub const DEFAULT_REGION: &str = "us-east-1";

static AWS_REGION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{2}(-[a-z0-9]+)+$").unwrap());

/// Lowercase region names like "us-east-1"
pub fn is_valid_region(region: &str) -> bool {
    region.len() <= 32 && AWS_REGION.is_match(region)
}

const RESOURCE_PREFIX: &str = "cloud-advisor";

/// Render an AWS provider block plus one resource per supported service.
/// Services without a Terraform mapping are listed as comments.
pub fn render(services: &[ServiceDetail], region: &str) -> String {
    let region = if region.trim().is_empty() {
        DEFAULT_REGION
    } else {
        region.trim()
    };

    let mut out = String::new();
    let mut needs_db_password = false;
    let mut needs_ami = false;

    let mut resources = String::new();
    let mut unmanaged = Vec::new();

    for service in services {
        match service.service_name.as_str() {
            "EC2" => {
                needs_ami = true;
                let _ = write!(
                    resources,
                    r#"
resource "aws_instance" "{slot}" {{
  ami           = data.aws_ami.al2023.id
  instance_type = "{instance_type}"

  tags = {{
    Name = "{RESOURCE_PREFIX}-{slot}"
  }}
}}
"#,
                    slot = service.slot,
                    instance_type = service.instance_type,
                );
            }
            "RDS" => {
                needs_db_password = true;
                let _ = write!(
                    resources,
                    r#"
resource "aws_db_instance" "{slot}" {{
  identifier          = "{RESOURCE_PREFIX}-db"
  engine              = "mysql"
  engine_version      = "8.0"
  instance_class      = "{instance_type}"
  allocated_storage   = 20
  db_name             = "app"
  username            = "admin"
  password            = var.db_password
  skip_final_snapshot = true
}}
"#,
                    slot = service.slot,
                    instance_type = service.instance_type,
                );
            }
            "DynamoDB" => {
                let _ = write!(
                    resources,
                    r#"
resource "aws_dynamodb_table" "{slot}" {{
  name         = "{RESOURCE_PREFIX}-state"
  billing_mode = "PAY_PER_REQUEST"
  hash_key     = "pk"

  attribute {{
    name = "pk"
    type = "S"
  }}
}}
"#,
                    slot = service.slot,
                );
            }
            name if name.starts_with("S3") => {
                let _ = write!(
                    resources,
                    r#"
resource "aws_s3_bucket" "{slot}" {{
  bucket_prefix = "{RESOURCE_PREFIX}-"
}}
"#,
                    slot = service.slot,
                );
                if name != "S3" {
                    unmanaged.push(service);
                }
            }
            _ => unmanaged.push(service),
        }
    }

    let _ = writeln!(out, "provider \"aws\" {{\n  region = \"{region}\"\n}}");

    if needs_db_password {
        let _ = write!(
            out,
            "\nvariable \"db_password\" {{\n  type      = string\n  sensitive = true\n}}\n"
        );
    }

    if needs_ami {
        let _ = write!(
            out,
            r#"
data "aws_ami" "al2023" {{
  most_recent = true
  owners      = ["amazon"]

  filter {{
    name   = "name"
    values = ["al2023-ami-*-x86_64"]
  }}
}}
"#
        );
    }

    out.push_str(&resources);

    if !unmanaged.is_empty() {
        out.push_str("\n# Not managed here, configure separately:\n");
        for service in unmanaged {
            let _ = writeln!(
                out,
                "#   {} ({}): {}",
                service.service_name, service.instance_type, service.slot
            );
        }
    }

    out
}
