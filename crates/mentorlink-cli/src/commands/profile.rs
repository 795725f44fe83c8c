use super::CliContext;
use anyhow::Result;
use clap::Args;
use mentorlink_core::slot::TimeSlot;
use mentorlink_core::user::{NewUser, ProfilePatch, User, UserRole};

#[derive(Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub name: String,
    /// elderly, volunteer or family
    #[arg(long)]
    pub role: UserRole,
    /// 6000-0000, 60000000 or +507 6000-0000
    #[arg(long)]
    pub phone: String,
    /// Panamanian cedula, e.g. 8-123-4567
    #[arg(long)]
    pub cedula: String,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub bio: Option<String>,
    #[arg(long)]
    pub specialty: Option<String>,
    #[arg(long = "skill")]
    pub skills: Vec<String>,
    /// Offered slot as "YYYY-MM-DD HH:MM" (volunteers only, repeatable)
    #[arg(long = "slot", value_parser = parse_slot)]
    pub slots: Vec<TimeSlot>,
}

#[derive(Args)]
pub struct UpdateArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub cedula: Option<String>,
    #[arg(long)]
    pub image: Option<String>,
    /// Replaces the skill list (repeatable)
    #[arg(long = "skill")]
    pub skills: Vec<String>,
    /// Raw JSON patch; unknown fields are rejected
    #[arg(long, conflicts_with_all = ["name", "phone", "cedula", "image", "skills"])]
    pub patch: Option<String>,
}

fn parse_slot(value: &str) -> Result<TimeSlot, String> {
    value
        .split_once(' ')
        .and_then(|(date, time)| TimeSlot::parse(date, time))
        .ok_or_else(|| format!("expected \"YYYY-MM-DD HH:MM\", got \"{value}\""))
}

pub async fn register(ctx: &CliContext, args: RegisterArgs) -> Result<()> {
    let user = ctx
        .services
        .profiles
        .register_user(NewUser {
            full_name: args.name,
            role: args.role,
            phone: args.phone,
            cedula: args.cedula,
            email: args.email,
            location: args.location,
            bio: args.bio,
            specialty: args.specialty,
            interests: Vec::new(),
            skills: args.skills,
            availability: args.slots,
        })
        .await?;

    ctx.emit(&user, |user| {
        println!("Registered {} as {} ({}).", user.full_name, user.role, user.id);
        println!("Pass --user {} to act as this user.", user.id);
    })
}

pub async fn show(ctx: &CliContext) -> Result<()> {
    let user = ctx.services.profiles.get_user(&ctx.user).await?;
    ctx.emit(&user, print_profile)
}

pub async fn update(ctx: &CliContext, args: UpdateArgs) -> Result<()> {
    let profiles = &ctx.services.profiles;
    let user = match args.patch {
        Some(json) => profiles.update_profile_json(&ctx.user, &json).await?,
        None => {
            let patch = ProfilePatch {
                full_name: args.name,
                phone: args.phone,
                cedula: args.cedula,
                profile_image: args.image,
                interests: None,
                skills: (!args.skills.is_empty()).then_some(args.skills),
            };
            profiles.update_profile(&ctx.user, patch).await?
        }
    };
    ctx.emit(&user, print_profile)
}

fn print_profile(user: &User) {
    println!("{} ({})", user.full_name, user.id);
    println!("  role:     {}", user.role);
    println!("  phone:    {}", user.phone);
    println!("  cedula:   {}", user.cedula);
    for (label, value) in [
        ("email", &user.email),
        ("location", &user.location),
        ("specialty", &user.specialty),
        ("bio", &user.bio),
    ] {
        if let Some(value) = value {
            println!("  {:<9} {}", format!("{label}:"), value);
        }
    }
    if !user.interests.is_empty() {
        let names: Vec<_> = user.interests.iter().map(|i| i.name.as_str()).collect();
        println!("  interests: {}", names.join(", "));
    }
    if !user.skills.is_empty() {
        println!("  skills:   {}", user.skills.join(", "));
    }
    if user.is_volunteer() {
        println!("  offers {} slots", user.availability.len());
    }
}
