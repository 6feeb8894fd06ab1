//! Server-side rendering of the public single-page site.
//!
//! The page is built once per request from the four collections: hero
//! (profile), works gallery, skills bars, footer. Everything here is pure;
//! fetching and error handling live at the handler.

use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::models::{Profile, Skill, SocialLink, Work, WorkCategory};

/// In-memory category filter over an already-fetched list.
/// None means "all" and returns the full list.
pub fn filter_works<'a>(works: &'a [Work], category: Option<WorkCategory>) -> Vec<&'a Work> {
    match category {
        None => works.iter().collect(),
        Some(c) => works.iter().filter(|w| w.category == c).collect(),
    }
}

/// The count-up sequence a skill bar displays: linear interpolation from 0 in
/// increments of target/50, rounded per tick, clamped to the target on the
/// final tick. The last frame always equals the stored percentage.
pub fn percentage_frames(target: i32) -> Vec<i32> {
    let mut frames = Vec::new();
    let step = target as f64 / 50.0;
    let mut current = 0.0;
    loop {
        current += step;
        if current >= target as f64 {
            frames.push(target);
            break;
        }
        frames.push(current.round() as i32);
    }
    frames
}

/// The known footer icon set. Unresolved names map to the default link glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocialIcon {
    Facebook,
    Instagram,
    Twitter,
    Linkedin,
    Github,
    Link,
}

impl SocialIcon {
    pub fn glyph(&self) -> &'static str {
        match self {
            SocialIcon::Facebook => "fb",
            SocialIcon::Instagram => "ig",
            SocialIcon::Twitter => "tw",
            SocialIcon::Linkedin => "in",
            SocialIcon::Github => "gh",
            SocialIcon::Link => "#",
        }
    }
}

pub fn icon_for(name: &str) -> SocialIcon {
    match name {
        "Facebook" => SocialIcon::Facebook,
        "Instagram" => SocialIcon::Instagram,
        "Twitter" => SocialIcon::Twitter,
        "Linkedin" => SocialIcon::Linkedin,
        "Github" => SocialIcon::Github,
        _ => SocialIcon::Link,
    }
}

const STYLE: &str = r#"
body{margin:0;font-family:system-ui,sans-serif;color:#0f172a}
section{min-height:60vh;padding:5rem 1rem}
.container{max-width:64rem;margin:0 auto}
.hero-img{width:16rem;height:16rem;border-radius:50%;object-fit:cover}
.hero-fallback{width:16rem;height:16rem;border-radius:50%;background:#cbd5e1;display:flex;align-items:center;justify-content:center;font-size:4rem;color:#fff}
.filters button{margin:.25rem;padding:.5rem 1.25rem;border-radius:9999px;border:0;background:#f1f5f9;cursor:pointer}
.filters button.active{background:#0f172a;color:#fff}
.works-grid{display:grid;grid-template-columns:repeat(auto-fill,minmax(16rem,1fr));gap:2rem}
.work-card img{width:100%;aspect-ratio:1;object-fit:cover;border-radius:1rem}
.skill-track{height:1rem;background:#e2e8f0;border-radius:9999px;overflow:hidden}
.skill-fill{height:100%;background:#334155;width:0;transition:width .1s linear}
footer{background:#0f172a;color:#fff;padding:3rem 1rem}
footer a{color:#cbd5e1;text-decoration:none;margin-right:1rem}
"#;

const SCRIPT: &str = r#"
document.querySelectorAll('.filters button').forEach(function(btn){
  btn.addEventListener('click',function(){
    document.querySelectorAll('.filters button').forEach(function(b){b.classList.remove('active')});
    btn.classList.add('active');
    var cat=btn.dataset.category;
    document.querySelectorAll('.work-card').forEach(function(card){
      card.style.display=(cat==='all'||card.dataset.category===cat)?'':'none';
    });
  });
});
var animated=false;
function animateSkills(){
  if(animated)return;
  animated=true;
  document.querySelectorAll('.skill').forEach(function(el){
    var target=parseInt(el.dataset.percentage,10)||0;
    var fill=el.querySelector('.skill-fill');
    var label=el.querySelector('.skill-value');
    var current=0,step=target/50;
    var timer=setInterval(function(){
      current+=step;
      if(current>=target){current=target;clearInterval(timer);}
      var shown=Math.round(current);
      fill.style.width=shown+'%';
      label.textContent=shown+'%';
    },20);
  });
}
var skillsSection=document.getElementById('skills');
if(skillsSection){
  new IntersectionObserver(function(entries){
    entries.forEach(function(e){if(e.isIntersecting)animateSkills();});
  },{threshold:0.3}).observe(skillsSection);
}
"#;

/// The full public page. Empty fields fall back to placeholder text; empty
/// collections render empty sections rather than failing.
pub fn site_page(
    profile: Option<&Profile>,
    works: &[Work],
    skills: &[Skill],
    social_links: &[SocialLink],
) -> Markup {
    let name = profile
        .map(|p| p.name.as_str())
        .filter(|n| !n.is_empty())
        .unwrap_or("Your Name");
    let subtitle = profile
        .map(|p| p.subtitle.as_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("I am a Graphics Designer");
    let description = profile
        .map(|p| p.description.as_str())
        .filter(|d| !d.is_empty())
        .unwrap_or("A passionate graphics designer specializing in creating stunning visual experiences.");

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (name) " | Portfolio" }
                style { (PreEscaped(STYLE)) }
            }
            body {
                (hero_section(profile, name, subtitle, description))
                (works_section(works))
                (skills_section(skills))
                (footer_section(profile, social_links))
                script { (PreEscaped(SCRIPT)) }
            }
        }
    }
}

fn hero_section(profile: Option<&Profile>, name: &str, subtitle: &str, description: &str) -> Markup {
    let image_url = profile
        .map(|p| p.profile_image_url.as_str())
        .filter(|u| !u.is_empty());

    html! {
        section id="home" {
            div class="container" {
                @if let Some(url) = image_url {
                    img class="hero-img" src=(url) alt=(name);
                } @else {
                    div class="hero-fallback" {
                        (name.chars().next().unwrap_or('G'))
                    }
                }
                h1 { (name) }
                p class="subtitle" { (subtitle) }
                p { (description) }
            }
        }
    }
}

fn works_section(works: &[Work]) -> Markup {
    html! {
        section id="works" {
            div class="container" {
                h2 { "My Works" }
                div class="filters" {
                    button data-category="all" class="active" { "All Works" }
                    @for category in WorkCategory::ALL {
                        button data-category=(category.as_str()) { (category.label()) }
                    }
                }
                @if works.is_empty() {
                    p class="empty" { "No works found in this category" }
                } @else {
                    div class="works-grid" {
                        @for work in works {
                            div class="work-card" data-category=(work.category.as_str()) {
                                @if !work.image_url.is_empty() {
                                    img src=(work.image_url) alt=(work.title);
                                }
                                h3 { (work.title) }
                                p class="category" { (work.category.label()) }
                                @if !work.description.is_empty() {
                                    p { (work.description) }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn skills_section(skills: &[Skill]) -> Markup {
    html! {
        section id="skills" {
            div class="container" {
                h2 { "My Skills" }
                @for skill in skills {
                    div class="skill" data-percentage=(skill.percentage) {
                        h3 { (skill.name) }
                        span class="skill-value" { "0%" }
                        div class="skill-track" {
                            div class="skill-fill" {}
                        }
                    }
                }
            }
        }
    }
}

fn footer_section(profile: Option<&Profile>, social_links: &[SocialLink]) -> Markup {
    let email = profile.map(|p| p.email.as_str()).filter(|e| !e.is_empty());
    let phone = profile.map(|p| p.phone.as_str()).filter(|p| !p.is_empty());

    html! {
        footer {
            div class="container" {
                @if let Some(email) = email {
                    a href={ "mailto:" (email) } { (email) }
                }
                @if let Some(phone) = phone {
                    a href={ "tel:" (phone) } { (phone) }
                }
                div class="social" {
                    @for link in social_links {
                        a href=(link.url) title=(link.platform) {
                            (icon_for(&link.icon_name).glyph())
                        }
                    }
                }
            }
        }
    }
}
